//! Document Node Module
//!
//! シートから抽出された文書構造（見出し、段落、テーブルなど）を表す型を定義するモジュール。

use serde::{Deserialize, Serialize};

use crate::error::HouganshiError;
use crate::types::MergeRange;

/// 見出しレベル（1〜6）
///
/// 範囲外の値は構築時に拒否されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const H1: HeadingLevel = HeadingLevel(1);
    pub const H2: HeadingLevel = HeadingLevel(2);
    pub const H3: HeadingLevel = HeadingLevel(3);
    pub const H4: HeadingLevel = HeadingLevel(4);
    pub const H5: HeadingLevel = HeadingLevel(5);
    pub const H6: HeadingLevel = HeadingLevel(6);

    /// レベル値を取得
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = HouganshiError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (1..=6).contains(&level) {
            Ok(HeadingLevel(level))
        } else {
            Err(HouganshiError::Config(format!(
                "Heading level must be between 1 and 6, got {}",
                level
            )))
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.0
    }
}

/// リストの項目（子項目を持つ木構造）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ListItem>,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ListItem>) -> Self {
        self.children = children;
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// 文書ノード
///
/// 1シートの内容は`Vec<DocumentNode>`で表され、並び順に意味があります。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentNode {
    /// 見出し
    Heading { level: HeadingLevel, text: String },

    /// 段落
    Paragraph {
        text: String,
        #[serde(default, skip_serializing_if = "is_false")]
        bold: bool,
        #[serde(default, skip_serializing_if = "is_false")]
        italic: bool,
    },

    /// テーブル
    ///
    /// `merges`は領域内のセルが参照する結合範囲で、描画には影響しません。
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        merges: Vec<MergeRange>,
    },

    /// 箇条書き・番号付きリスト
    List { ordered: bool, items: Vec<ListItem> },

    /// 画像
    Image { alt: String, path: String },

    /// 見出し付きのまとまり
    Section {
        title: String,
        children: Vec<DocumentNode>,
    },

    /// 水平線
    HorizontalRule,
}

impl DocumentNode {
    /// 見出しノードを生成
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        DocumentNode::Heading {
            level,
            text: text.into(),
        }
    }

    /// 装飾なしの段落ノードを生成
    pub fn paragraph(text: impl Into<String>) -> Self {
        DocumentNode::Paragraph {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    /// 結合情報なしのテーブルノードを生成
    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        DocumentNode::Table {
            headers,
            rows,
            merges: Vec::new(),
        }
    }
}

/// シート1枚分の文書（シート名とノード列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    pub name: String,
    pub nodes: Vec<DocumentNode>,
}
