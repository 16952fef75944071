//! Grid Module
//!
//! セル結合を解決し、結合範囲の左上セルだけが残る論理グリッドを構築するモジュール。

use std::collections::HashMap;

use crate::types::{Cell, CellCoord, Sheet};

/// 結合範囲内の座標に対する割り当て
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeSlot {
    /// 結合範囲の左上（値を持つ位置）
    Anchor,
    /// 結合により隠れる位置
    Covered,
}

/// 結合解決後の論理グリッド
///
/// 行は1〜`row_count`、各行は列順に並んだ可視セルのみを保持します。
/// セルは元の`Sheet`から借用されます。
#[derive(Debug)]
pub struct LogicalGrid<'a> {
    /// 可視セル（行ごと、列順）
    rows: Vec<Vec<&'a Cell>>,

    /// 行数
    row_count: u32,

    /// 列数
    col_count: u32,
}

impl<'a> LogicalGrid<'a> {
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn col_count(&self) -> u32 {
        self.col_count
    }

    /// 行ごとの可視セル（インデックス0が1行目）
    pub fn rows(&self) -> &[Vec<&'a Cell>] {
        &self.rows
    }

    /// 行優先順に可視セルを走査
    pub fn cells(&self) -> impl Iterator<Item = &'a Cell> + '_ {
        self.rows.iter().flat_map(|row| row.iter().copied())
    }

    /// 可視セルの総数
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定座標の可視セルを取得
    ///
    /// 結合により隠れた座標や、セルが存在しない座標では`None`を返します。
    pub fn get(&self, row: u32, col: u32) -> Option<&'a Cell> {
        if row == 0 {
            return None;
        }
        let cells = self.rows.get((row - 1) as usize)?;
        cells
            .binary_search_by_key(&col, |cell| cell.col)
            .ok()
            .map(|index| cells[index])
    }
}

/// セル結合リゾルバー
pub struct MergeResolver;

impl MergeResolver {
    /// シートから論理グリッドを構築
    ///
    /// # 引数
    ///
    /// * `sheet` - 対象シート
    ///
    /// # 戻り値
    ///
    /// 結合範囲ごとに左上セル1つ（セルが存在する場合のみ）と、
    /// 結合されていない全セルを含む論理グリッド
    pub fn resolve(sheet: &Sheet) -> LogicalGrid<'_> {
        let row_count = sheet.row_count();
        let col_count = sheet.col_count();
        let lookup = Self::build_lookup(sheet);

        let mut rows: Vec<Vec<&Cell>> = vec![Vec::new(); row_count as usize];

        // Sheet::cellsは行優先順に並んでいる
        for cell in sheet.cells() {
            if cell.row == 0 || cell.col == 0 {
                continue;
            }
            match lookup.get(&cell.coord()) {
                Some(MergeSlot::Covered) => continue,
                Some(MergeSlot::Anchor) | None => {
                    rows[(cell.row - 1) as usize].push(cell);
                }
            }
        }

        let grid = LogicalGrid {
            rows,
            row_count,
            col_count,
        };

        log::trace!(
            "Resolved sheet '{}': {} cells, {} merges -> {} visible cells",
            sheet.name(),
            sheet.cells().len(),
            sheet.merges().len(),
            grid.len()
        );

        grid
    }

    /// 結合範囲内の座標から割り当てへのマップを構築（内部ヘルパー）
    ///
    /// シートの行数・列数を超える座標にはセルが存在しないため、範囲はグリッド内に切り詰めます。
    fn build_lookup(sheet: &Sheet) -> HashMap<CellCoord, MergeSlot> {
        let mut lookup = HashMap::new();

        for range in sheet.merges() {
            let end_row = range.end_row.min(sheet.row_count());
            let end_col = range.end_col.min(sheet.col_count());

            for row in range.start_row..=end_row {
                for col in range.start_col..=end_col {
                    let coord = CellCoord::new(row, col);
                    let slot = if coord == range.anchor() {
                        MergeSlot::Anchor
                    } else {
                        MergeSlot::Covered
                    };
                    lookup.insert(coord, slot);
                }
            }
        }

        lookup
    }
}
