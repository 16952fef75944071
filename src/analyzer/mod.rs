//! Analyzer Module
//!
//! 論理グリッドから文書構造（見出し、段落、テーブル）を抽出するモジュール。

mod heading;
mod structure;
mod table;

pub use heading::{HeadingClassifier, DEFAULT_BASE_FONT_SIZE};
pub use structure::StructureAnalyzer;
pub use table::{TableDetector, TableRegion};
