//! houganshi-md - 方眼紙Excelの文書構造をMarkdownに抽出するライブラリ
//!
//! セル幅を小さくそろえてレイアウトした「Excel方眼紙」から、
//! 見出し・段落・罫線で囲まれた表を抽出し、Markdownに変換します。
//!
//! 処理は次の順に進みます。
//!
//! 1. `WorkbookDecoder`: XLSXをシートモデル（`Sheet`）にデコード
//! 2. `MergeResolver`: 結合範囲を解決し、論理グリッドを構築
//! 3. `TableDetector`: 罫線付きセルの連結領域から表を検出
//! 4. `StructureAnalyzer`: 表以外のセルを見出し・段落に分類
//! 5. `MarkdownRenderer`: ノード列をMarkdownに整形
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use houganshi_md::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("houganshi.xlsx")?;
//!     let output = File::create("houganshi.md")?;
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # シートモデルから直接変換
//!
//! デコーダーを使わずに`Sheet`を組み立てて、コアのパイプラインだけを実行できます。
//!
//! ```rust
//! use houganshi_md::{Cell, ConverterBuilder, Sheet, Style};
//!
//! # fn main() -> Result<(), houganshi_md::HouganshiError> {
//! let sheet = Sheet::new(
//!     "報告書",
//!     vec![
//!         Cell::new(1, 1, "月次報告").with_style(Style::new().with_font_size(20.0)),
//!         Cell::new(3, 1, "本文です。"),
//!     ],
//!     vec![],
//! );
//!
//! let converter = ConverterBuilder::new().build()?;
//! assert_eq!(converter.render_sheet(&sheet), "# 月次報告\n\n本文です。\n");
//! # Ok(())
//! # }
//! ```
//!
//! # シートごとの変換
//!
//! ```rust,no_run
//! use std::fs::File;
//! use houganshi_md::{ConverterBuilder, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Names(vec!["表紙".to_string(), "本文".to_string()]))
//!         .build()?;
//!
//!     for output in converter.convert_sheets(File::open("houganshi.xlsx")?)? {
//!         println!("== {} ==\n{}", output.name, output.content);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod analyzer;
mod api;
mod builder;
mod error;
mod grid;
mod node;
mod output;
mod parser;
mod security;
mod types;

// 公開API
pub use analyzer::{
    HeadingClassifier, StructureAnalyzer, TableDetector, TableRegion, DEFAULT_BASE_FONT_SIZE,
};
pub use api::{OutputFormat, SheetSelector};
pub use builder::{Converter, ConverterBuilder, SheetOutput};
pub use error::HouganshiError;
pub use grid::{LogicalGrid, MergeResolver};
pub use node::{DocumentNode, HeadingLevel, ListItem, SheetDocument};
pub use output::{escape_table_cell, sanitize_file_stem, MarkdownRenderer};
pub use parser::WorkbookDecoder;
pub use types::{
    Alignment, Border, BorderKind, Borders, Cell, CellCoord, CellValue, MergeRange, Sheet, Style,
};
