//! Types Module
//!
//! シートモデル（セル、スタイル、結合範囲、シート）を定義するモジュール。
//! デコーダーが生成し、コアパイプラインが読み取り専用で消費する入力境界です。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// セルの値を表す列挙型
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// 論理値
    Bool(bool),

    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),

    /// 値なし
    #[default]
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値のテキスト表現を取得
    ///
    /// 数値は整数値なら小数点なし（`42`）、それ以外は最短の往復可能な表現（`1.5`）、
    /// 論理値は`true`/`false`、値なしは空文字列になります。
    /// 絶対値が1e21以上または1e-6未満の数値は指数表記（`1e+21`、`1.5e-7`）になります。
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => number_text(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 数値のテキスト表現（内部ヘルパー）
fn number_text(n: f64) -> String {
    let magnitude = n.abs();
    if n.is_finite() && (magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6)) {
        let exponent = format!("{:e}", n);
        match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exponent,
        }
    } else {
        n.to_string()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// セル座標（1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (1, 1) -> "A1"）
    pub fn to_a1_notation(&self) -> String {
        format!("{}{}", Self::col_index_to_letter(self.col), self.row)
    }

    /// A1形式の文字列を座標に変換（例: "B3" -> (3, 2)）
    ///
    /// 絶対参照の`$`は無視します。列文字の後に行番号が続かない場合や、
    /// 行・列が0になる場合は`None`を返します。
    pub fn from_a1(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let split = reference
            .char_indices()
            .find(|(_, ch)| ch.is_ascii_digit())
            .map(|(i, _)| i)?;
        let (col_part, row_part) = reference.split_at(split);

        let mut col: u32 = 0;
        let mut letters = 0;
        for ch in col_part.chars().filter(|ch| *ch != '$') {
            if !ch.is_ascii_alphabetic() {
                return None;
            }
            let value = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            col = col.checked_mul(26)?.checked_add(value)?;
            letters += 1;
        }
        if letters == 0 {
            return None;
        }

        let row: u32 = row_part.parse().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self { row, col })
    }

    /// 列番号を文字列に変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
    fn col_index_to_letter(col: u32) -> String {
        let mut result = String::new();
        let mut n = col;
        while n > 0 {
            let remainder = (n - 1) % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            n = (n - 1) / 26;
        }
        result
    }
}

/// 罫線の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderKind {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Double,
    Dotted,
    Dashed,
}

/// 一辺の罫線
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub kind: BorderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Border {
    /// 色なしの罫線を生成
    pub fn new(kind: BorderKind) -> Self {
        Self { kind, color: None }
    }

    /// 罫線が引かれているか
    pub fn is_drawn(&self) -> bool {
        self.kind != BorderKind::None
    }
}

/// 四辺の罫線
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borders {
    pub top: Border,
    pub bottom: Border,
    pub left: Border,
    pub right: Border,
}

impl Borders {
    /// 四辺すべてに同じ種類の罫線を持つ値を生成
    pub fn all(kind: BorderKind) -> Self {
        Self {
            top: Border::new(kind),
            bottom: Border::new(kind),
            left: Border::new(kind),
            right: Border::new(kind),
        }
    }

    /// いずれかの辺に罫線が引かれているか
    pub fn any(&self) -> bool {
        self.top.is_drawn()
            || self.bottom.is_drawn()
            || self.left.is_drawn()
            || self.right.is_drawn()
    }
}

/// 配置のヒント
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(default)]
    pub wrap_text: bool,
}

/// セルのスタイル
///
/// 色は`#RRGGBB`形式、または未設定（`None`）です。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub borders: Borders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

impl Style {
    /// デフォルトスタイル（罫線なし、太字なし、背景なし）を生成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_background(mut self, color: &str) -> Self {
        self.background_color = Some(color.to_string());
        self
    }

    pub fn with_borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// 罫線付きセルかどうか（四辺のいずれかが`None`以外）
    pub fn is_bordered(&self) -> bool {
        self.borders.any()
    }

    /// 白以外の背景色が設定されているか
    pub fn has_background(&self) -> bool {
        self.background_color
            .as_deref()
            .is_some_and(|color| !color.eq_ignore_ascii_case("#FFFFFF"))
    }
}

/// セル結合範囲（1始まり、両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergeRange {
    /// 新しい結合範囲を生成
    ///
    /// 開始が終了より大きい、または座標が0の場合は`None`を返します。
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Option<Self> {
        if start_row == 0 || start_col == 0 || start_row > end_row || start_col > end_col {
            return None;
        }
        Some(Self {
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }

    /// `A1:C3`形式の参照から結合範囲を生成
    pub fn from_a1_range(reference: &str) -> Option<Self> {
        let (start, end) = reference.split_once(':')?;
        let start = CellCoord::from_a1(start)?;
        let end = CellCoord::from_a1(end)?;
        Self::new(start.row, start.col, end.row, end.col)
    }

    /// 左上（アンカー）座標
    pub fn anchor(&self) -> CellCoord {
        CellCoord::new(self.start_row, self.start_col)
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start_row
            && coord.row <= self.end_row
            && coord.col >= self.start_col
            && coord.col <= self.end_col
    }

    /// 結合セルの行数
    pub fn row_span(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// 結合セルの列数
    pub fn col_span(&self) -> u32 {
        self.end_col - self.start_col + 1
    }
}

/// シート上の1セル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    #[serde(default)]
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeRange>,
    #[serde(default)]
    pub style: Style,
}

impl Cell {
    /// デフォルトスタイルのセルを生成
    pub fn new(row: u32, col: u32, value: impl Into<CellValue>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
            formula: None,
            merge: None,
            style: Style::default(),
        }
    }

    /// 値もスタイルも持たない空セル（テーブル補完用）を生成
    pub fn placeholder(row: u32, col: u32) -> Self {
        Self::new(row, col, CellValue::Empty)
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_formula(mut self, formula: &str) -> Self {
        self.formula = Some(formula.to_string());
        self
    }

    /// セルの座標
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }

    /// 値のテキスト表現
    pub fn text(&self) -> String {
        self.value.to_text()
    }
}

/// 1シート分のセル集合
///
/// セルは行優先順で保持され、座標は一意です（同じ座標のセルは後勝ち）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    name: String,
    cells: Vec<Cell>,
    merges: Vec<MergeRange>,
    row_count: u32,
    col_count: u32,
}

impl Sheet {
    /// セルと結合範囲からシートを構築
    ///
    /// 結合範囲内にあり結合参照を持たないセルには、その範囲への参照を付与します。
    /// 行数・列数はセルが存在する最大の行・列です。
    pub fn new(name: impl Into<String>, cells: Vec<Cell>, merges: Vec<MergeRange>) -> Self {
        let mut by_coord: BTreeMap<CellCoord, Cell> = BTreeMap::new();
        for cell in cells {
            by_coord.insert(cell.coord(), cell);
        }

        let mut row_count = 0;
        let mut col_count = 0;
        let cells: Vec<Cell> = by_coord
            .into_values()
            .map(|mut cell| {
                if cell.merge.is_none() {
                    cell.merge = merges.iter().find(|m| m.contains(cell.coord())).copied();
                }
                row_count = row_count.max(cell.row);
                col_count = col_count.max(cell.col);
                cell
            })
            .collect();

        Self {
            name: name.into(),
            cells,
            merges,
            row_count,
            col_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 行優先順のセル一覧
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// セルが存在する最大の行番号
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// セルが存在する最大の列番号
    pub fn col_count(&self) -> u32 {
        self.col_count
    }

    /// 指定座標のセルを取得
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells
            .binary_search_by_key(&(row, col), |cell| (cell.row, cell.col))
            .ok()
            .map(|index| &self.cells[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_to_text() {
        assert_eq!(CellValue::Empty.to_text(), "");
        assert_eq!(CellValue::Number(42.0).to_text(), "42");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert_eq!(CellValue::Number(-3.0).to_text(), "-3");
        assert_eq!(CellValue::Number(1e21).to_text(), "1e+21");
        assert_eq!(CellValue::Number(-2.5e22).to_text(), "-2.5e+22");
        assert_eq!(CellValue::Number(1.5e-7).to_text(), "1.5e-7");
        assert_eq!(CellValue::Number(1e20).to_text(), "100000000000000000000");
        assert_eq!(CellValue::Number(0.000001).to_text(), "0.000001");
        assert_eq!(CellValue::Text("hello".to_string()).to_text(), "hello");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
        assert_eq!(CellValue::Bool(false).to_text(), "false");
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_cell_coord_to_a1_notation() {
        assert_eq!(CellCoord::new(1, 1).to_a1_notation(), "A1");
        assert_eq!(CellCoord::new(1, 26).to_a1_notation(), "Z1");
        assert_eq!(CellCoord::new(1, 27).to_a1_notation(), "AA1");
        assert_eq!(CellCoord::new(100, 702).to_a1_notation(), "ZZ100");
        assert_eq!(CellCoord::new(1, 703).to_a1_notation(), "AAA1");
    }

    #[test]
    fn test_cell_coord_from_a1() {
        assert_eq!(CellCoord::from_a1("A1"), Some(CellCoord::new(1, 1)));
        assert_eq!(CellCoord::from_a1("B3"), Some(CellCoord::new(3, 2)));
        assert_eq!(CellCoord::from_a1("AA10"), Some(CellCoord::new(10, 27)));
        assert_eq!(CellCoord::from_a1("$C$4"), Some(CellCoord::new(4, 3)));
        assert_eq!(CellCoord::from_a1("c5"), Some(CellCoord::new(5, 3)));

        assert_eq!(CellCoord::from_a1(""), None);
        assert_eq!(CellCoord::from_a1("A"), None);
        assert_eq!(CellCoord::from_a1("12"), None);
        assert_eq!(CellCoord::from_a1("A0"), None);
        assert_eq!(CellCoord::from_a1("A1B"), None);
    }

    #[test]
    fn test_style_is_bordered() {
        assert!(!Style::new().is_bordered());

        let mut style = Style::new();
        style.borders.bottom = Border::new(BorderKind::Dotted);
        assert!(style.is_bordered());

        assert!(Style::new()
            .with_borders(Borders::all(BorderKind::Double))
            .is_bordered());
    }

    #[test]
    fn test_style_has_background() {
        assert!(!Style::new().has_background());
        assert!(!Style::new().with_background("#FFFFFF").has_background());
        assert!(!Style::new().with_background("#ffffff").has_background());
        assert!(Style::new().with_background("#FFFF00").has_background());
    }

    #[test]
    fn test_merge_range_new_rejects_malformed() {
        assert!(MergeRange::new(1, 1, 2, 3).is_some());
        assert!(MergeRange::new(2, 1, 1, 3).is_none());
        assert!(MergeRange::new(1, 3, 2, 1).is_none());
        assert!(MergeRange::new(0, 1, 2, 2).is_none());
    }

    #[test]
    fn test_merge_range_from_a1_range() {
        let range = MergeRange::from_a1_range("B2:D5").unwrap();
        assert_eq!(range.anchor(), CellCoord::new(2, 2));
        assert_eq!(range.row_span(), 4);
        assert_eq!(range.col_span(), 3);

        assert!(MergeRange::from_a1_range("B2").is_none());
        assert!(MergeRange::from_a1_range("D5:B2").is_none());
    }

    #[test]
    fn test_merge_range_contains() {
        let range = MergeRange::new(1, 1, 2, 3).unwrap();
        assert!(range.contains(CellCoord::new(1, 1)));
        assert!(range.contains(CellCoord::new(2, 3)));
        assert!(!range.contains(CellCoord::new(3, 1)));
        assert!(!range.contains(CellCoord::new(1, 4)));
    }

    #[test]
    fn test_sheet_orders_cells_and_counts() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![
                Cell::new(3, 1, "c"),
                Cell::new(1, 2, "b"),
                Cell::new(1, 1, "a"),
            ],
            vec![],
        );

        let coords: Vec<CellCoord> = sheet.cells().iter().map(Cell::coord).collect();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
                CellCoord::new(3, 1)
            ]
        );
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.col_count(), 2);
        assert_eq!(sheet.cell(1, 2).map(Cell::text), Some("b".to_string()));
        assert!(sheet.cell(2, 2).is_none());
    }

    #[test]
    fn test_sheet_duplicate_coordinates_last_wins() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![Cell::new(1, 1, "first"), Cell::new(1, 1, "second")],
            vec![],
        );
        assert_eq!(sheet.cells().len(), 1);
        assert_eq!(sheet.cell(1, 1).unwrap().text(), "second");
    }

    #[test]
    fn test_sheet_attaches_merge_references() {
        let merge = MergeRange::new(1, 1, 1, 2).unwrap();
        let sheet = Sheet::new(
            "Sheet1",
            vec![Cell::new(1, 1, "Title"), Cell::new(2, 1, "Body")],
            vec![merge],
        );
        assert_eq!(sheet.cell(1, 1).unwrap().merge, Some(merge));
        assert_eq!(sheet.cell(2, 1).unwrap().merge, None);
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = Sheet::new("Empty", vec![], vec![]);
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.col_count(), 0);
        assert!(sheet.cells().is_empty());
    }

    #[test]
    fn test_cell_formula_serialization() {
        let with_formula = Cell::new(2, 2, 3.0).with_formula("A1+2");
        let json = serde_json::to_value(&with_formula).unwrap();
        assert_eq!(json["formula"], "A1+2");

        let plain = serde_json::to_value(Cell::new(1, 1, 1.0)).unwrap();
        assert!(plain.get("formula").is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_a1_notation_round_trip(row in 1u32..1_048_577, col in 1u32..16_385) {
                let coord = CellCoord::new(row, col);
                let a1 = coord.to_a1_notation();
                prop_assert_eq!(CellCoord::from_a1(&a1), Some(coord));
            }
        }
    }
}
