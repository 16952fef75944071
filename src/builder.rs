//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analyzer::{HeadingClassifier, StructureAnalyzer, DEFAULT_BASE_FONT_SIZE};
use crate::api::{OutputFormat, SheetSelector};
use crate::error::HouganshiError;
use crate::node::{DocumentNode, SheetDocument};
use crate::output::{sanitize_file_stem, MarkdownRenderer, OutputFormatter};
use crate::parser::WorkbookDecoder;
use crate::types::Sheet;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 見出し判定の基準フォントサイズ（pt）
    pub base_font_size: f64,

    /// 出力フォーマット
    pub output_format: OutputFormat,

    /// シートを並列に処理するか
    pub parallel: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::All,
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            output_format: OutputFormat::Markdown,
            parallel: true,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値があり、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use houganshi_md::{ConverterBuilder, OutputFormat, SheetSelector};
///
/// # fn main() -> Result<(), houganshi_md::HouganshiError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_base_font_size(10.5)
///     .with_output_format(OutputFormat::Json)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 基準フォントサイズ: 11pt
    /// - 出力フォーマット: Markdown
    /// - 並列処理: 有効
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// 存在しないシート名や範囲外のインデックスは変換時にエラーになります。
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 見出し判定の基準フォントサイズを設定する
    pub fn with_base_font_size(mut self, size: f64) -> Self {
        self.config.base_font_size = size;
        self
    }

    /// 出力フォーマットを設定する
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// シートを並列に処理するかを設定する
    ///
    /// 並列処理の有無にかかわらず、出力は常にワークブックのシート順です。
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # エラー
    ///
    /// * `HouganshiError::Config` - 基準フォントサイズが有限の正の値でない場合
    pub fn build(self) -> Result<Converter, HouganshiError> {
        let size = self.config.base_font_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(HouganshiError::Config(format!(
                "Invalid base font size: {} (must be a positive number)",
                size
            )));
        }

        Ok(Converter::new(self.config))
    }
}

/// シート1枚分の変換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOutput {
    /// シート名
    pub name: String,
    /// 出力フォーマットに応じた内容
    pub content: String,
}

/// 変換処理のファサード
///
/// ワークブックをデコードし、シートごとに構造解析とレンダリングを行います。
///
/// # 使用例
///
/// ```rust,no_run
/// use houganshi_md::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), houganshi_md::HouganshiError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("houganshi.xlsx")?;
/// let output = File::create("houganshi.md")?;
/// converter.convert(input, output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
    analyzer: StructureAnalyzer,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        let analyzer = StructureAnalyzer::new(HeadingClassifier::new(config.base_font_size));
        Self { config, analyzer }
    }

    /// シートを文書ノード列に解析する
    ///
    /// 任意のデコーダーで構築した`Sheet`を入力にできます。
    pub fn analyze_sheet(&self, sheet: &Sheet) -> Vec<DocumentNode> {
        self.analyzer.analyze(sheet)
    }

    /// シートをMarkdown文字列に変換する
    pub fn render_sheet(&self, sheet: &Sheet) -> String {
        MarkdownRenderer::render(&self.analyze_sheet(sheet))
    }

    /// ワークブックをシートごとに変換する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<SheetOutput>)` - ワークブックのシート順に並んだ変換結果
    /// * `Err(HouganshiError)` - デコードやシート選択に失敗した場合
    pub fn convert_sheets<R: Read + Seek>(
        &self,
        input: R,
    ) -> Result<Vec<SheetOutput>, HouganshiError> {
        let formatter = OutputFormatter::from_format(self.config.output_format);

        self.analyze_workbook(input)?
            .into_iter()
            .map(|document| {
                let content = formatter.render_sheet(&document)?;
                Ok(SheetOutput {
                    name: document.name,
                    content,
                })
            })
            .collect()
    }

    /// ワークブックを変換してライターに書き出す
    ///
    /// Markdown形式ではシートごとに`# Sheet: <name>`見出しを付け、
    /// JSON形式では`{ "name", "nodes" }`の配列を出力します。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use houganshi_md::ConverterBuilder;
    /// use std::io::Cursor;
    ///
    /// # fn main() -> Result<(), houganshi_md::HouganshiError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let excel_data: Vec<u8> = vec![]; // XLSXファイルのバイト列
    /// let mut markdown_output = Vec::new();
    /// converter.convert(Cursor::new(excel_data), &mut markdown_output)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read + Seek, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<(), HouganshiError> {
        let documents = self.analyze_workbook(input)?;

        let mut writer = BufWriter::new(&mut output);
        OutputFormatter::from_format(self.config.output_format).render(&documents, &mut writer)?;
        writer.flush()?;

        Ok(())
    }

    /// ワークブックを変換して文字列で返す
    pub fn convert_to_string<R: Read + Seek>(&self, input: R) -> Result<String, HouganshiError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        let result = String::from_utf8(buffer).map_err(|e| e.utf8_error())?;

        Ok(result)
    }

    /// ワークブックを変換し、シートごとのファイルとしてディレクトリに書き出す
    ///
    /// ファイル名はシート名（ファイル名に使えない文字を`_`に置換）に
    /// 出力フォーマットの拡張子を付けたものです。ディレクトリは必要に応じて作成します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<PathBuf>)` - 書き出したファイルのパス（シート順）
    pub fn convert_to_dir<R: Read + Seek>(
        &self,
        input: R,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, HouganshiError> {
        let dir = dir.as_ref();
        let outputs = self.convert_sheets(input)?;

        fs::create_dir_all(dir)?;

        let extension = self.config.output_format.file_extension();
        let mut written = Vec::with_capacity(outputs.len());
        for output in outputs {
            let path = dir.join(format!("{}.{}", sanitize_file_stem(&output.name), extension));
            fs::write(&path, output.content.as_bytes())?;
            log::debug!("Wrote sheet '{}' to {}", output.name, path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// 選択されたシートをデコードし、文書ノード列に解析する（内部ヘルパー）
    ///
    /// デコードはワークブックへの可変参照を必要とするため順に行い、
    /// 構造解析のみを並列化します。
    fn analyze_workbook<R: Read + Seek>(
        &self,
        input: R,
    ) -> Result<Vec<SheetDocument>, HouganshiError> {
        let mut decoder = WorkbookDecoder::open(input)?;
        let sheet_names = decoder.select_sheets(&self.config.sheet_selector)?;

        let sheets = sheet_names
            .iter()
            .map(|name| decoder.decode_sheet(name))
            .collect::<Result<Vec<_>, _>>()?;

        let analyze = |sheet: &Sheet| SheetDocument {
            name: sheet.name().to_string(),
            nodes: self.analyze_sheet(sheet),
        };

        // rayonのcollectは元の順序を保つ
        let documents: Vec<SheetDocument> = if self.config.parallel {
            sheets.par_iter().map(analyze).collect()
        } else {
            sheets.iter().map(analyze).collect()
        };

        log::debug!("Analyzed {} sheet(s)", documents.len());

        Ok(documents)
    }
}
