//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use std::io::Write;

use crate::error::HouganshiError;
use crate::node::SheetDocument;
use crate::output::markdown::MarkdownRenderer;

/// Markdown形式のフォーマッター
///
/// シートごとに`# Sheet: <name>`見出しを付け、空行で区切って出力します。
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn render<W: Write>(
        &self,
        documents: &[SheetDocument],
        writer: &mut W,
    ) -> Result<(), HouganshiError> {
        for (index, document) in documents.iter().enumerate() {
            if index > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "# Sheet: {}", document.name)?;
            writeln!(writer)?;
            write!(writer, "{}", self.render_sheet(document))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// シート1枚分の本文（シート見出しなし）
    pub fn render_sheet(&self, document: &SheetDocument) -> String {
        MarkdownRenderer::render(&document.nodes)
    }
}

/// JSON形式のフォーマッター
///
/// `{ "name", "nodes" }`オブジェクトの配列を出力します。
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn render<W: Write>(
        &self,
        documents: &[SheetDocument],
        writer: &mut W,
    ) -> Result<(), HouganshiError> {
        serde_json::to_writer_pretty(&mut *writer, documents)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// シート1枚分のノード列（整形済みJSON）
    pub fn render_sheet(&self, document: &SheetDocument) -> Result<String, HouganshiError> {
        let mut json = serde_json::to_string_pretty(&document.nodes)?;
        json.push('\n');
        Ok(json)
    }
}
