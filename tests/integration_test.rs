//! Integration Tests for houganshi-md
//!
//! rust_xlsxwriterで生成したワークブックを変換し、
//! デコードから構造抽出、Markdown/JSON出力までを通しで検証します。

use std::io::Cursor;

use houganshi_md::{
    CellValue, ConverterBuilder, HouganshiError, OutputFormat, SheetSelector, WorkbookDecoder,
};
use rust_xlsxwriter::*;

// テスト用ワークブックの生成
mod fixtures {
    use super::*;

    pub fn bordered() -> Format {
        Format::new().set_border(FormatBorder::Thin)
    }

    pub fn bordered_header() -> Format {
        bordered().set_bold()
    }

    /// 太字ヘッダー付きの2x2罫線表
    pub fn generate_bordered_table() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string_with_format(0, 0, "項目", &bordered_header())?;
        worksheet.write_string_with_format(0, 1, "内容", &bordered_header())?;
        worksheet.write_string_with_format(1, 0, "件名", &bordered())?;
        worksheet.write_string_with_format(1, 1, "月次報告", &bordered())?;

        Ok(workbook.save_to_buffer()?)
    }

    /// フォントサイズと太字による見出し、本文、斜体の注記
    pub fn generate_headings() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string_with_format(0, 0, "報告書", &Format::new().set_font_size(20))?;
        worksheet.write_string_with_format(
            2,
            0,
            "概要",
            &Format::new().set_font_size(14).set_bold(),
        )?;
        worksheet.write_string(3, 0, "  今月の作業内容をまとめます。  ")?;
        worksheet.write_string_with_format(5, 2, "注記", &Format::new().set_italic())?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 方眼紙らしく横に結合したタイトル
    pub fn generate_merged_title() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.merge_range(0, 0, 0, 5, "業務報告書", &Format::new().set_font_size(16))?;
        worksheet.merge_range(2, 1, 3, 4, "部署: 開発部", &Format::new())?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 結合したヘッダーセルを持つ罫線表
    pub fn generate_table_with_merged_header() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.merge_range(0, 0, 0, 1, "期間", &bordered_header())?;
        worksheet.write_string_with_format(0, 2, "担当", &bordered_header())?;
        worksheet.write_string_with_format(1, 0, "4月", &bordered())?;
        worksheet.write_string_with_format(1, 1, "5月", &bordered())?;
        worksheet.write_string_with_format(1, 2, "田中", &bordered())?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 値のない罫線付きセルを含む表（ヘッダー行なし）
    pub fn generate_blank_bordered_cells() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string_with_format(0, 0, "x", &bordered())?;
        worksheet.write_blank(0, 1, &bordered())?;
        worksheet.write_blank(1, 0, &bordered())?;
        worksheet.write_blank(1, 1, &bordered())?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 背景色のヘッダー行を持つ表と、その前後の本文
    pub fn generate_table_between_prose() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header = bordered().set_background_color(Color::RGB(0xD9E1F2));

        worksheet.write_string_with_format(0, 0, "売上", &Format::new().set_font_size(16))?;
        worksheet.write_string_with_format(2, 0, "月", &header)?;
        worksheet.write_string_with_format(2, 1, "金額", &header)?;
        worksheet.write_string_with_format(3, 0, "4月", &bordered())?;
        worksheet.write_number_with_format(3, 1, 1200.5, &bordered())?;
        worksheet.write_string(5, 0, "以上")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 3枚のシート
    pub fn generate_multi_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        for name in ["表紙", "本文", "付録"] {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;
            worksheet.write_string(0, 0, format!("{}の内容", name))?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 日付と数値
    pub fn generate_dates_and_numbers() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date = ExcelDateTime::from_ymd(2024, 1, 15)?;

        worksheet.write_datetime_with_format(
            0,
            0,
            &date,
            &Format::new().set_num_format("yyyy-mm-dd"),
        )?;
        worksheet.write_number(1, 0, 42.0)?;
        worksheet.write_number(2, 0, 3.25)?;
        worksheet.write_boolean(3, 0, true)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// 数式セル（キャッシュ値ありと空のもの）
    pub fn generate_formulas() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_formula_result_default("");

        worksheet.write_number(0, 0, 1.0)?;
        worksheet.write_formula(1, 1, Formula::new("=A1+2").set_result("3"))?;
        worksheet.write_formula(2, 1, "=B2*2")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// ファイル名に使えない文字を含むシート名
    pub fn generate_unsafe_sheet_names() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        for name in ["売上<2024>", "集計|月次"] {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;
            worksheet.write_string(0, 0, "本文")?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn convert_single_sheet(data: Vec<u8>) -> String {
    let converter = ConverterBuilder::new().build().unwrap();
    let mut outputs = converter.convert_sheets(Cursor::new(data)).unwrap();
    assert_eq!(outputs.len(), 1);
    outputs.remove(0).content
}

#[test]
fn test_bordered_table_with_bold_header() {
    let data = fixtures::generate_bordered_table().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let markdown = converter.convert_to_string(Cursor::new(data)).unwrap();

    assert_eq!(
        markdown,
        "# Sheet: Sheet1\n\n| 項目 | 内容 |\n| --- | --- |\n| 件名 | 月次報告 |\n"
    );
}

#[test]
fn test_headings_and_paragraphs() {
    let data = fixtures::generate_headings().unwrap();

    let markdown = convert_single_sheet(data);

    assert_eq!(
        markdown,
        "# 報告書\n\n## 概要\n\n今月の作業内容をまとめます。\n\n*注記*\n"
    );
}

#[test]
fn test_merged_cells_emit_anchor_only() {
    let data = fixtures::generate_merged_title().unwrap();

    let markdown = convert_single_sheet(data);

    assert_eq!(markdown, "## 業務報告書\n\n部署: 開発部\n");
}

#[test]
fn test_table_with_merged_header_cell() {
    let data = fixtures::generate_table_with_merged_header().unwrap();

    let markdown = convert_single_sheet(data);

    // 結合で隠れたB1はプレースホルダー（空セル）になる
    assert_eq!(
        markdown,
        "| 期間 |  | 担当 |\n| --- | --- | --- |\n| 4月 | 5月 | 田中 |\n"
    );
}

#[test]
fn test_table_merges_in_json() {
    let data = fixtures::generate_table_with_merged_header().unwrap();
    let converter = ConverterBuilder::new()
        .with_output_format(OutputFormat::Json)
        .build()
        .unwrap();

    let json = converter.convert_to_string(Cursor::new(data)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let table = &value[0]["nodes"][0];
    assert_eq!(table["type"], "table");
    assert_eq!(table["headers"], serde_json::json!(["期間", "", "担当"]));
    assert_eq!(table["merges"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_blank_bordered_cells_form_table() {
    let data = fixtures::generate_blank_bordered_cells().unwrap();

    let markdown = convert_single_sheet(data);

    assert_eq!(
        markdown,
        "| Column 1 | Column 2 |\n| --- | --- |\n| x |  |\n|  |  |\n"
    );
}

#[test]
fn test_tables_follow_prose() {
    let data = fixtures::generate_table_between_prose().unwrap();

    let markdown = convert_single_sheet(data);

    assert_eq!(
        markdown,
        "## 売上\n\n以上\n\n| 月 | 金額 |\n| --- | --- |\n| 4月 | 1200.5 |\n"
    );
}

#[test]
fn test_dates_and_numbers() {
    let data = fixtures::generate_dates_and_numbers().unwrap();

    let markdown = convert_single_sheet(data);

    assert_eq!(
        markdown,
        "2024-01-15T00:00:00.000Z\n\n42\n\n3.25\n\ntrue\n"
    );
}

#[test]
fn test_formula_cells_keep_source() {
    let data = fixtures::generate_formulas().unwrap();
    let mut decoder = WorkbookDecoder::open(Cursor::new(data)).unwrap();

    let sheet = decoder.decode_sheet("Sheet1").unwrap();

    let cached = sheet.cell(2, 2).unwrap();
    assert_eq!(cached.formula.as_deref(), Some("A1+2"));
    assert_eq!(cached.value, CellValue::Number(3.0));

    // キャッシュ値が空でも数式は残る
    let uncached = sheet.cell(3, 2).unwrap();
    assert_eq!(uncached.formula.as_deref(), Some("B2*2"));
    assert_eq!(uncached.value.to_text(), "");

    assert_eq!(sheet.cell(1, 1).unwrap().formula, None);
}

#[test]
fn test_formula_cells_render_cached_values() {
    let data = fixtures::generate_formulas().unwrap();

    let markdown = convert_single_sheet(data);

    assert_eq!(markdown, "1\n\n3\n");
}

#[test]
fn test_multi_sheets_in_workbook_order() {
    let data = fixtures::generate_multi_sheets().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let markdown = converter.convert_to_string(Cursor::new(data)).unwrap();

    assert_eq!(
        markdown,
        "# Sheet: 表紙\n\n表紙の内容\n\n# Sheet: 本文\n\n本文の内容\n\n# Sheet: 付録\n\n付録の内容\n"
    );
}

#[test]
fn test_sheet_selection_keeps_workbook_order() {
    let data = fixtures::generate_multi_sheets().unwrap();
    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Names(vec![
            "付録".to_string(),
            "表紙".to_string(),
        ]))
        .build()
        .unwrap();

    let outputs = converter.convert_sheets(Cursor::new(data)).unwrap();

    let names: Vec<&str> = outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["表紙", "付録"]);
    assert_eq!(outputs[1].content, "付録の内容\n");
}

#[test]
fn test_sheet_selection_by_index() {
    let data = fixtures::generate_multi_sheets().unwrap();
    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(1))
        .build()
        .unwrap();

    let outputs = converter.convert_sheets(Cursor::new(data)).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "本文");
}

#[test]
fn test_sheet_selection_errors() {
    let data = fixtures::generate_multi_sheets().unwrap();

    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(3))
        .build()
        .unwrap();
    let result = converter.convert_sheets(Cursor::new(data.clone()));
    assert!(matches!(result, Err(HouganshiError::Config(_))));

    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("存在しない".to_string()))
        .build()
        .unwrap();
    let result = converter.convert_sheets(Cursor::new(data));
    assert!(matches!(result, Err(HouganshiError::Config(_))));
}

#[test]
fn test_parallel_and_sequential_output_match() {
    let data = fixtures::generate_multi_sheets().unwrap();

    let parallel = ConverterBuilder::new()
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data.clone()))
        .unwrap();
    let sequential = ConverterBuilder::new()
        .with_parallel(false)
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data))
        .unwrap();

    assert_eq!(parallel, sequential);
}

#[test]
fn test_json_output() {
    let data = fixtures::generate_headings().unwrap();
    let converter = ConverterBuilder::new()
        .with_output_format(OutputFormat::Json)
        .build()
        .unwrap();

    let json = converter.convert_to_string(Cursor::new(data)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["name"], "Sheet1");
    let nodes = value[0]["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(
        nodes[0],
        serde_json::json!({"type": "heading", "level": 1, "text": "報告書"})
    );
    assert_eq!(nodes[3]["type"], "paragraph");
    assert_eq!(nodes[3]["italic"], true);
    assert!(nodes[3].get("bold").is_none());
}

#[test]
fn test_convert_to_dir() {
    let data = fixtures::generate_unsafe_sheet_names().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");
    let converter = ConverterBuilder::new().build().unwrap();

    let written = converter.convert_to_dir(Cursor::new(data), &target).unwrap();

    assert_eq!(
        written,
        vec![target.join("売上_2024_.md"), target.join("集計_月次.md")]
    );
    for path in &written {
        assert_eq!(std::fs::read_to_string(path).unwrap(), "本文\n");
    }
}

#[test]
fn test_convert_to_dir_json_extension() {
    let data = fixtures::generate_bordered_table().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let converter = ConverterBuilder::new()
        .with_output_format(OutputFormat::Json)
        .build()
        .unwrap();

    let written = converter.convert_to_dir(Cursor::new(data), dir.path()).unwrap();

    assert_eq!(written, vec![dir.path().join("Sheet1.json")]);
    let content = std::fs::read_to_string(&written[0]).unwrap();
    let nodes: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(nodes[0]["type"], "table");
}

#[test]
fn test_invalid_input_is_rejected() {
    let converter = ConverterBuilder::new().build().unwrap();

    let result = converter.convert_to_string(Cursor::new(b"PK not really a zip".to_vec()));

    assert!(result.is_err());
}
