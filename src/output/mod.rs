//! Output Format Module
//!
//! Markdownレンダラーと、出力フォーマットの切り替えを提供するモジュール。

mod formatters;
mod markdown;

use std::io::Write;

use crate::api::OutputFormat;
use crate::error::HouganshiError;
use crate::node::SheetDocument;

pub use formatters::*;
pub use markdown::{escape_table_cell, MarkdownRenderer};

/// 出力フォーマッター（Strategy Pattern）
#[derive(Debug, Clone, Copy)]
pub enum OutputFormatter {
    Markdown,
    Json,
}

impl OutputFormatter {
    /// 出力フォーマットからフォーマッターを生成
    pub fn from_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => OutputFormatter::Markdown,
            OutputFormat::Json => OutputFormatter::Json,
        }
    }

    /// 複数シートの文書を出力する
    ///
    /// # 引数
    ///
    /// * `documents` - 出力する文書（ワークブックのシート順）
    /// * `writer` - 出力先のライター
    pub fn render<W: Write>(
        &self,
        documents: &[SheetDocument],
        writer: &mut W,
    ) -> Result<(), HouganshiError> {
        match self {
            OutputFormatter::Markdown => MarkdownFormatter.render(documents, writer),
            OutputFormatter::Json => JsonFormatter.render(documents, writer),
        }
    }

    /// シート1枚分の内容を文字列として出力する
    pub fn render_sheet(&self, document: &SheetDocument) -> Result<String, HouganshiError> {
        match self {
            OutputFormatter::Markdown => Ok(MarkdownFormatter.render_sheet(document)),
            OutputFormatter::Json => JsonFormatter.render_sheet(document),
        }
    }
}

/// シート名をファイル名として使える形に変換
///
/// `/ \ ? % * : | " < >` をそれぞれ`_`に置き換えます。
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '_',
            other => other,
        })
        .collect()
}
