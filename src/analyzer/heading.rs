//! 見出し判定
//!
//! セルのスタイル（フォントサイズ、太字、背景色）から見出しレベルを判定します。

use crate::node::HeadingLevel;
use crate::types::Cell;

/// 基準フォントサイズのデフォルト値（pt）
pub const DEFAULT_BASE_FONT_SIZE: f64 = 11.0;

/// 見出し判定器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingClassifier {
    base_font_size: f64,
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_FONT_SIZE)
    }
}

impl HeadingClassifier {
    /// 基準フォントサイズを指定して判定器を生成
    ///
    /// 基準フォントサイズはフォントサイズ未設定のセルに適用されます。
    pub fn new(base_font_size: f64) -> Self {
        Self { base_font_size }
    }

    pub fn base_font_size(&self) -> f64 {
        self.base_font_size
    }

    /// セルの見出しレベルを判定
    ///
    /// テキストが空または空白のみのセルは、スタイルに関係なく見出しになりません。
    pub fn classify(&self, cell: &Cell) -> Option<HeadingLevel> {
        if cell.text().trim().is_empty() {
            return None;
        }

        let font_size = cell.style.font_size.unwrap_or(self.base_font_size);
        Self::level_for(font_size, cell.style.bold, cell.style.has_background())
    }

    /// (フォントサイズ, 太字, 背景色あり) から見出しレベルを決定
    ///
    /// 上から順に評価し、最初に一致した行のレベルを返します。
    pub fn level_for(font_size: f64, bold: bool, background: bool) -> Option<HeadingLevel> {
        let level = if font_size >= 20.0 {
            HeadingLevel::H1
        } else if font_size >= 16.0 {
            HeadingLevel::H2
        } else if font_size >= 14.0 && bold {
            HeadingLevel::H2
        } else if font_size >= 14.0 {
            HeadingLevel::H3
        } else if font_size >= 12.0 && bold && background {
            HeadingLevel::H3
        } else if font_size >= 12.0 && bold {
            HeadingLevel::H4
        } else if bold && background {
            HeadingLevel::H4
        } else if bold {
            HeadingLevel::H5
        } else {
            return None;
        };

        Some(level)
    }
}
