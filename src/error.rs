//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// houganshi-mdクレート全体で使用するエラー型
///
/// 構造抽出とMarkdown生成（コアパイプライン）は失敗しない純粋な変換であり、
/// このエラー型が現れるのはワークブックのデコード、設定の検証、
/// シリアライズ、I/Oのいずれかに限られます。
///
/// # 使用例
///
/// ```rust,no_run
/// use houganshi_md::HouganshiError;
/// use std::fs::File;
///
/// fn open_workbook(path: &str) -> Result<File, HouganshiError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum HouganshiError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// calamineがワークブックの解析中に返したエラー
    ///
    /// ファイル形式が不正、破損したファイル、サポートされていない形式などが
    /// 原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// XMLパーツ（styles.xml、ワークシートなど）の解析エラー
    #[error("XML parse error in '{part}': {message}")]
    Xml {
        /// 解析中だったパーツのパス
        part: String,
        /// エラーの詳細
        message: String,
    },

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 整数の解析エラー
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// 浮動小数点数の解析エラー（フォントサイズなど）
    #[error("Number parse error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// JSON出力のシリアライズエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時の検証、または存在しないシートの指定などで
    /// 発生します。
    ///
    /// ```rust,no_run
    /// use houganshi_md::{ConverterBuilder, HouganshiError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_base_font_size(0.0)
    ///     .build();
    ///
    /// if let Err(HouganshiError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、入力サイズ上限などの違反時に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl HouganshiError {
    /// XML解析エラーを生成するヘルパー
    pub(crate) fn xml(part: &str, message: impl std::fmt::Display) -> Self {
        HouganshiError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}
