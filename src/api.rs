//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートを変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("表紙".to_string())`
    Name(String),

    /// 複数のインデックス指定
    ///
    /// 例: `SheetSelector::Indices(vec![0, 2])`
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputFormat {
    /// Markdown形式（デフォルト）
    ///
    /// # 出力例
    ///
    /// ```markdown
    /// # Sheet: 報告書
    ///
    /// ## 概要
    ///
    /// | 項目 | 内容 |
    /// | --- | --- |
    /// | 件名 | 月次報告 |
    /// ```
    #[default]
    Markdown,

    /// JSON形式
    ///
    /// シートごとのノード列を出力します。
    ///
    /// # 出力例
    ///
    /// ```json
    /// [
    ///   {
    ///     "name": "報告書",
    ///     "nodes": [
    ///       { "type": "heading", "level": 2, "text": "概要" }
    ///     ]
    ///   }
    /// ]
    /// ```
    Json,
}

impl OutputFormat {
    /// ファイル出力時の拡張子
    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}
