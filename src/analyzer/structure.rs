//! 文書構造の組み立て
//!
//! テーブル領域の検出と、テーブル領域外のセルの見出し・段落判定を行い、
//! シート1枚分のノード列を生成します。

use crate::analyzer::heading::HeadingClassifier;
use crate::analyzer::table::{TableDetector, TableRegion};
use crate::grid::MergeResolver;
use crate::node::DocumentNode;
use crate::types::{CellCoord, Sheet};

/// 文書構造アナライザー
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureAnalyzer {
    classifier: HeadingClassifier,
}

impl StructureAnalyzer {
    pub fn new(classifier: HeadingClassifier) -> Self {
        Self { classifier }
    }

    /// シートからノード列を生成
    ///
    /// 見出し・段落を読み順（行優先）に並べたあと、テーブルを検出順に追加します。
    /// テーブルは本文中の位置に関係なく、常に見出し・段落の後に置かれます。
    pub fn analyze(&self, sheet: &Sheet) -> Vec<DocumentNode> {
        let grid = MergeResolver::resolve(sheet);
        let regions = TableDetector::detect(&grid);

        let mut nodes = Vec::new();
        for cell in grid.cells() {
            if Self::in_table(&regions, cell.coord()) {
                continue;
            }

            let text = cell.text();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            match self.classifier.classify(cell) {
                Some(level) => nodes.push(DocumentNode::Heading { level, text }),
                None => nodes.push(DocumentNode::Paragraph {
                    text: trimmed.to_string(),
                    bold: cell.style.bold,
                    italic: cell.style.italic,
                }),
            }
        }

        let prose = nodes.len();
        nodes.extend(regions.iter().map(TableRegion::to_node));

        log::debug!(
            "Analyzed sheet '{}': {} prose nodes, {} tables",
            sheet.name(),
            prose,
            regions.len()
        );

        nodes
    }

    fn in_table(regions: &[TableRegion], coord: CellCoord) -> bool {
        regions.iter().any(|region| region.contains(coord))
    }
}
