//! テーブル領域検出
//!
//! 罫線付きセルの4近傍連結成分を幅優先探索で求め、
//! 2行以上かつ2列以上に広がる成分の外接矩形をテーブルとして切り出します。

use std::collections::VecDeque;

use crate::grid::LogicalGrid;
use crate::node::DocumentNode;
use crate::types::{Cell, CellCoord, MergeRange};

/// 訪問済みフラグ（行優先のフラットなバッファ）
///
/// 1回の検出処理の間だけ存在します。
struct VisitedGrid {
    rows: u32,
    cols: u32,
    flags: Vec<bool>,
}

impl VisitedGrid {
    fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            flags: vec![false; rows as usize * cols as usize],
        }
    }

    fn offset(&self, coord: CellCoord) -> Option<usize> {
        if coord.row == 0 || coord.col == 0 || coord.row > self.rows || coord.col > self.cols {
            return None;
        }
        Some((coord.row - 1) as usize * self.cols as usize + (coord.col - 1) as usize)
    }

    fn is_visited(&self, coord: CellCoord) -> bool {
        self.offset(coord).is_some_and(|i| self.flags[i])
    }

    /// 訪問済みにする。未訪問だった場合は`true`
    fn visit(&mut self, coord: CellCoord) -> bool {
        match self.offset(coord) {
            Some(i) if !self.flags[i] => {
                self.flags[i] = true;
                true
            }
            _ => false,
        }
    }
}

/// 検出されたテーブル領域
///
/// 外接矩形全体をセルで埋めた矩形グリッドを保持します。
/// 連結成分に含まれない座標やセルが存在しない座標は、空のプレースホルダーセルです。
#[derive(Debug, Clone, PartialEq)]
pub struct TableRegion {
    bounds: MergeRange,
    cells: Vec<Vec<Cell>>,
}

impl TableRegion {
    /// 外接矩形（1始まり、両端を含む）
    pub fn bounds(&self) -> MergeRange {
        self.bounds
    }

    /// 矩形グリッド（行ごと）
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// 座標が領域（外接矩形）内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.bounds.contains(coord)
    }

    /// 1行目がヘッダー行かどうか（太字または白以外の背景色のセルを含む）
    pub fn has_header_row(&self) -> bool {
        self.cells.first().is_some_and(|row| {
            row.iter()
                .any(|cell| cell.style.bold || cell.style.has_background())
        })
    }

    /// テーブルノードに変換
    ///
    /// ヘッダー行がない場合は`Column 1`, `Column 2`, ... を見出しとし、全行をデータ行とします。
    pub fn to_node(&self) -> DocumentNode {
        let texts: Vec<Vec<String>> = self
            .cells
            .iter()
            .map(|row| row.iter().map(Cell::text).collect())
            .collect();

        let (headers, rows) = if self.has_header_row() {
            let mut iter = texts.into_iter();
            let headers = iter.next().unwrap_or_default();
            (headers, iter.collect())
        } else {
            let headers = (1..=self.bounds.col_span())
                .map(|i| format!("Column {}", i))
                .collect();
            (headers, texts)
        };

        let mut merges: Vec<MergeRange> = Vec::new();
        for merge in self.cells.iter().flatten().filter_map(|cell| cell.merge) {
            if !merges.contains(&merge) {
                merges.push(merge);
            }
        }

        DocumentNode::Table {
            headers,
            rows,
            merges,
        }
    }
}

/// テーブル領域検出器
pub struct TableDetector;

impl TableDetector {
    /// 論理グリッドからテーブル領域を検出
    ///
    /// 領域は行優先の走査で最初に訪れた順に返されます。
    pub fn detect(grid: &LogicalGrid<'_>) -> Vec<TableRegion> {
        // 罫線付きセルは必ずこの範囲に収まるため、訪問済みバッファもこの大きさで足りる
        let (max_row, max_col) = grid
            .cells()
            .filter(|cell| cell.style.is_bordered())
            .fold((0, 0), |(rows, cols), cell| {
                (rows.max(cell.row), cols.max(cell.col))
            });
        if max_row == 0 {
            return Vec::new();
        }

        let mut visited = VisitedGrid::new(max_row, max_col);
        let mut regions = Vec::new();

        for seed in grid.cells() {
            if !seed.style.is_bordered() || visited.is_visited(seed.coord()) {
                continue;
            }

            let component = Self::flood_fill(grid, seed.coord(), &mut visited);
            let Some(bounds) = Self::bounding_box(&component) else {
                continue;
            };

            if bounds.row_span() > 1 && bounds.col_span() > 1 {
                log::trace!(
                    "Table region {}:{} ({} bordered cells)",
                    bounds.anchor().to_a1_notation(),
                    CellCoord::new(bounds.end_row, bounds.end_col).to_a1_notation(),
                    component.len()
                );
                regions.push(Self::materialize(grid, bounds, &component));
            }
        }

        regions
    }

    /// 幅優先探索で連結成分を収集（内部ヘルパー）
    fn flood_fill(
        grid: &LogicalGrid<'_>,
        seed: CellCoord,
        visited: &mut VisitedGrid,
    ) -> Vec<CellCoord> {
        let mut component = Vec::new();
        let mut queue = VecDeque::new();

        visited.visit(seed);
        queue.push_back(seed);

        while let Some(coord) = queue.pop_front() {
            component.push(coord);

            for neighbor in Self::neighbors(coord) {
                let bordered = grid
                    .get(neighbor.row, neighbor.col)
                    .is_some_and(|cell| cell.style.is_bordered());
                if bordered && visited.visit(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        component
    }

    /// 上下左右の隣接座標（0行・0列は除外）
    fn neighbors(coord: CellCoord) -> impl Iterator<Item = CellCoord> {
        let CellCoord { row, col } = coord;
        [
            row.checked_sub(1).map(|r| CellCoord::new(r, col)),
            row.checked_add(1).map(|r| CellCoord::new(r, col)),
            col.checked_sub(1).map(|c| CellCoord::new(row, c)),
            col.checked_add(1).map(|c| CellCoord::new(row, c)),
        ]
        .into_iter()
        .flatten()
        .filter(|c| c.row > 0 && c.col > 0)
    }

    fn bounding_box(component: &[CellCoord]) -> Option<MergeRange> {
        let first = component.first()?;
        let (mut min_row, mut max_row) = (first.row, first.row);
        let (mut min_col, mut max_col) = (first.col, first.col);

        for coord in component {
            min_row = min_row.min(coord.row);
            max_row = max_row.max(coord.row);
            min_col = min_col.min(coord.col);
            max_col = max_col.max(coord.col);
        }

        MergeRange::new(min_row, min_col, max_row, max_col)
    }

    /// 外接矩形全体を矩形グリッドとして切り出す（内部ヘルパー）
    fn materialize(
        grid: &LogicalGrid<'_>,
        bounds: MergeRange,
        component: &[CellCoord],
    ) -> TableRegion {
        let width = bounds.col_span() as usize;
        let mut member = vec![false; bounds.row_span() as usize * width];
        for coord in component {
            let offset = (coord.row - bounds.start_row) as usize * width
                + (coord.col - bounds.start_col) as usize;
            member[offset] = true;
        }

        let cells = (bounds.start_row..=bounds.end_row)
            .map(|row| {
                (bounds.start_col..=bounds.end_col)
                    .map(|col| {
                        let offset = (row - bounds.start_row) as usize * width
                            + (col - bounds.start_col) as usize;
                        match grid.get(row, col) {
                            Some(cell) if member[offset] => cell.clone(),
                            _ => Cell::placeholder(row, col),
                        }
                    })
                    .collect()
            })
            .collect();

        TableRegion { bounds, cells }
    }
}
