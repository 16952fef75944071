//! Workbook Decoder
//!
//! XLSXワークブックを開き、シートごとに`Sheet`モデルへデコードします。

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_auto_from_rs, Reader, Sheets, Xlsx};

use crate::api::SheetSelector;
use crate::error::HouganshiError;
use crate::parser::values::cell_value;
use crate::parser::XlsxMetadataParser;
use crate::security::SecurityConfig;
use crate::types::{Cell, CellCoord, MergeRange, Sheet};

/// ワークブックデコーダー
///
/// calamineでセル値・数式・結合範囲を、XMLパーツからスタイルを取得し、
/// 両者を座標で突き合わせて`Sheet`を構築します。
pub struct WorkbookDecoder {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// XMLメタデータ
    metadata: XlsxMetadataParser,
}

impl WorkbookDecoder {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズとZIPアーカイブの検査を行ってから解析します。
    ///
    /// # 引数
    ///
    /// * `reader` - XLSXファイルを読み込むためのリーダー
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookDecoder)` - ワークブックの読み込みに成功した場合
    /// * `Err(HouganshiError)` - セキュリティ違反、破損したファイル、XLSX以外の形式の場合
    pub fn open<R: Read + Seek>(reader: R) -> Result<Self, HouganshiError> {
        Self::open_with_security(reader, &SecurityConfig::default())
    }

    pub(crate) fn open_with_security<R: Read + Seek>(
        mut reader: R,
        security: &SecurityConfig,
    ) -> Result<Self, HouganshiError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let metadata = XlsxMetadataParser::new(Cursor::new(buffer.as_slice()), security)?;

        let workbook = match open_workbook_auto_from_rs(Cursor::new(buffer))? {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(HouganshiError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        Ok(Self { workbook, metadata })
    }

    /// すべてのシート名（ワークブックの順序）
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// 選択結果は常にワークブックの順序で返します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト
    /// * `Err(HouganshiError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, HouganshiError> {
        let all_sheet_names = self.sheet_names();

        let index_of_name = |name: &String| {
            all_sheet_names
                .iter()
                .position(|candidate| candidate == name)
                .ok_or_else(|| HouganshiError::Config(format!("Sheet '{}' not found", name)))
        };
        let check_index = |index: usize| {
            if index >= all_sheet_names.len() {
                Err(HouganshiError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                )))
            } else {
                Ok(index)
            }
        };

        let mut indices = match selector {
            SheetSelector::All => (0..all_sheet_names.len()).collect(),
            SheetSelector::Index(index) => vec![check_index(*index)?],
            SheetSelector::Name(name) => vec![index_of_name(name)?],
            SheetSelector::Indices(indices) => indices
                .iter()
                .map(|&index| check_index(index))
                .collect::<Result<Vec<_>, _>>()?,
            SheetSelector::Names(names) => names
                .iter()
                .map(index_of_name)
                .collect::<Result<Vec<_>, _>>()?,
        };

        indices.sort_unstable();
        indices.dedup();

        Ok(indices
            .into_iter()
            .map(|index| all_sheet_names[index].clone())
            .collect())
    }

    /// シートをデコード
    ///
    /// ワークシートXMLに現れるセル（値のないスタイル付きセルを含む）と、
    /// calamineが値を返すセルの和集合がシートのセルになります。
    pub fn decode_sheet(&mut self, sheet_name: &str) -> Result<Sheet, HouganshiError> {
        // 1. 値
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| HouganshiError::Parse(e.into()))?;

        // 2. 数式
        let formula_range = self.workbook.worksheet_formula(sheet_name).ok();

        // 3. 結合範囲
        let merges = self.merge_ranges(sheet_name)?;

        let is_1904 = self.metadata.is_1904();
        let mut cells: BTreeMap<CellCoord, Cell> = BTreeMap::new();

        // 4. ワークシートXML上のセル（スタイル付き）
        for &(coord, xf_index) in self.metadata.styled_cells(sheet_name) {
            let mut cell = Cell::placeholder(coord.row, coord.col);
            cell.style = self.metadata.resolve_style(xf_index);
            cells.insert(coord, cell);
        }

        // 5. 値（calamineの位置は0始まり、Rangeの開始位置からの相対座標）
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            let coord = CellCoord::new(start_row + row as u32 + 1, start_col + col as u32 + 1);

            let value = cell_value(data, is_1904);
            if value.is_empty() && !cells.contains_key(&coord) {
                continue;
            }

            cells
                .entry(coord)
                .or_insert_with(|| Cell::placeholder(coord.row, coord.col))
                .value = value;
        }

        // 6. 数式（キャッシュ値が空でもセルとして残す）
        if let Some(formulas) = &formula_range {
            let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
            for (row, col, formula) in formulas.used_cells() {
                if formula.is_empty() {
                    continue;
                }
                let coord = CellCoord::new(start_row + row as u32 + 1, start_col + col as u32 + 1);
                cells
                    .entry(coord)
                    .or_insert_with(|| Cell::placeholder(coord.row, coord.col))
                    .formula = Some(formula.clone());
            }
        }

        let sheet = Sheet::new(sheet_name, cells.into_values().collect(), merges);

        log::debug!(
            "Decoded sheet '{}': {} cells, {} merges, {}x{}",
            sheet.name(),
            sheet.cells().len(),
            sheet.merges().len(),
            sheet.row_count(),
            sheet.col_count()
        );

        Ok(sheet)
    }

    /// シートの結合範囲を取得（内部ヘルパー）
    ///
    /// 不正な結合範囲は警告を出して個別にスキップします。
    fn merge_ranges(&mut self, sheet_name: &str) -> Result<Vec<MergeRange>, HouganshiError> {
        self.workbook
            .load_merged_regions()
            .map_err(|e| HouganshiError::Parse(e.into()))?;

        let dimensions = match self.workbook.worksheet_merge_cells(sheet_name) {
            Some(Ok(dimensions)) => dimensions,
            Some(Err(e)) => {
                log::warn!("Failed to read merged cells of '{}': {}", sheet_name, e);
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut merges: Vec<MergeRange> = Vec::with_capacity(dimensions.len());
        for dims in dimensions {
            let candidate = MergeRange::new(
                dims.start.0 + 1,
                dims.start.1 + 1,
                dims.end.0 + 1,
                dims.end.1 + 1,
            );
            match candidate {
                Some(range) if !merges.iter().any(|m| overlaps(m, &range)) => merges.push(range),
                Some(range) => log::warn!(
                    "Skipping merge range {}:{} overlapping another range in '{}'",
                    range.anchor().to_a1_notation(),
                    CellCoord::new(range.end_row, range.end_col).to_a1_notation(),
                    sheet_name
                ),
                None => log::warn!(
                    "Skipping malformed merge range {:?}-{:?} in '{}'",
                    dims.start,
                    dims.end,
                    sheet_name
                ),
            }
        }

        Ok(merges)
    }
}

fn overlaps(a: &MergeRange, b: &MergeRange) -> bool {
    a.start_row <= b.end_row
        && b.start_row <= a.end_row
        && a.start_col <= b.end_col
        && b.start_col <= a.end_col
}
