//! Markdown Renderer
//!
//! ノード列をMarkdown文字列に変換する。
//! 同じ入力からは常にバイト単位で同一の出力を生成します。

use crate::node::{DocumentNode, ListItem};

/// Markdownレンダラー
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// ノード列をMarkdown文字列に変換
    ///
    /// 空にならないノードだけを空行1つで連結し、3つ以上連続する改行を2つに縮め、
    /// 末尾の改行をちょうど1つにそろえます。
    pub fn render(nodes: &[DocumentNode]) -> String {
        let joined = Self::join_nodes(nodes);

        let mut result = collapse_newlines(&joined);
        result.truncate(result.trim_end_matches('\n').len());
        result.push('\n');
        result
    }

    /// 空文字列になるノード（空のテーブルなど）を除いて連結
    fn join_nodes(nodes: &[DocumentNode]) -> String {
        nodes
            .iter()
            .map(Self::render_node)
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// 単一ノードを変換
    pub fn render_node(node: &DocumentNode) -> String {
        match node {
            DocumentNode::Heading { level, text } => {
                format!("{} {}", "#".repeat(level.get() as usize), text)
            }
            DocumentNode::Paragraph { text, bold, italic } => match (bold, italic) {
                (true, true) => format!("***{}***", text),
                (true, false) => format!("**{}**", text),
                (false, true) => format!("*{}*", text),
                (false, false) => text.clone(),
            },
            DocumentNode::Table { headers, rows, .. } => Self::render_table(headers, rows),
            DocumentNode::List { ordered, items } => Self::render_list(items, *ordered, 0),
            DocumentNode::Image { alt, path } => format!("![{}]({})", alt, path),
            DocumentNode::Section { title, children } => {
                let body = Self::join_nodes(children);
                if body.is_empty() {
                    format!("## {}", title)
                } else {
                    format!("## {}\n\n{}", title, body)
                }
            }
            DocumentNode::HorizontalRule => "---".to_string(),
        }
    }

    /// テーブルを変換（内部ヘルパー）
    ///
    /// ヘッダーまたはデータ行が空のテーブルは空文字列になります。
    /// ヘッダーより短い行は空セルで埋め、長い行は切り詰めません。
    fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
        if headers.is_empty() || rows.is_empty() {
            return String::new();
        }

        let column_count = headers.len();
        let mut lines = Vec::with_capacity(rows.len() + 2);

        lines.push(Self::table_line(headers.iter().map(String::as_str)));
        lines.push(Self::table_line(std::iter::repeat("---").take(column_count)));

        for row in rows {
            let padding = column_count.saturating_sub(row.len());
            let cells = row
                .iter()
                .map(String::as_str)
                .chain(std::iter::repeat("").take(padding));
            lines.push(Self::table_line(cells));
        }

        lines.join("\n")
    }

    fn table_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
        let escaped: Vec<String> = cells.map(escape_table_cell).collect();
        format!("| {} |", escaped.join(" | "))
    }

    /// リストを変換（内部ヘルパー）
    ///
    /// 深さ1段ごとに半角スペース2つでインデントします。
    fn render_list(items: &[ListItem], ordered: bool, depth: usize) -> String {
        let indent = "  ".repeat(depth);
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let bullet = if ordered {
                    format!("{}.", index + 1)
                } else {
                    "-".to_string()
                };
                let line = format!("{}{} {}", indent, bullet, item.text);
                if item.children.is_empty() {
                    line
                } else {
                    format!(
                        "{}\n{}",
                        line,
                        Self::render_list(&item.children, ordered, depth + 1)
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// テーブルセルのエスケープ
///
/// `\` → `\\`、`|` → `\|`、改行 → `<br>` の順に置換します。
pub fn escape_table_cell(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\n', "<br>")
}

/// 3つ以上連続する改行を2つに縮める
fn collapse_newlines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut run = 0;

    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        result.push(ch);
    }

    result
}
