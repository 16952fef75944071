//! XML Metadata Parser Module
//!
//! XLSX内部のXMLパーツから、calamineで取得できない情報を抽出するモジュール。
//! シート名とワークシートパーツの対応、セルごとのスタイルインデックス、
//! スタイル定義、1904年エポック判定を提供します。

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::HouganshiError;
use crate::parser::attribute;
use crate::parser::styles::StyleTable;
use crate::security::SecurityConfig;
use crate::types::{CellCoord, Style};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const STYLES_PART: &str = "xl/styles.xml";

/// ワークシートに現れたセル（座標とcellXfsインデックス）
pub(crate) type StyledCell = (CellCoord, usize);

/// XLSXメタデータパーサー
#[derive(Debug, Clone)]
pub(crate) struct XlsxMetadataParser {
    /// スタイル定義
    styles: StyleTable,
    /// シート名 -> ワークシート内の全セル（行優先順）
    cell_styles: HashMap<String, Vec<StyledCell>>,
    /// 1904年エポックを使用するかどうか
    is_1904: bool,
}

impl XlsxMetadataParser {
    /// XLSXファイル（ZIPアーカイブ）からメタデータを解析
    ///
    /// 解析の前にアーカイブ全体をセキュリティ検査します。
    pub fn new<R: Read + Seek>(
        xlsx_reader: R,
        security: &SecurityConfig,
    ) -> Result<Self, HouganshiError> {
        let mut archive =
            ZipArchive::new(xlsx_reader).map_err(|e| HouganshiError::Zip(e.to_string()))?;
        security.check_archive(&mut archive)?;

        // 1. xl/styles.xml
        let styles = match read_part(&mut archive, STYLES_PART)? {
            Some(xml) => StyleTable::parse(&xml)?,
            None => StyleTable::default(),
        };

        // 2. xl/workbook.xml（シート一覧と1904年エポック）
        let (sheets, is_1904) = match read_part(&mut archive, WORKBOOK_PART)? {
            Some(xml) => parse_workbook(&xml)?,
            None => (Vec::new(), false),
        };

        // 3. xl/_rels/workbook.xml.rels（シートとパーツの対応）
        let relationships = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        // 4. 各ワークシートのセル
        let mut cell_styles = HashMap::new();
        for (name, relationship_id) in sheets {
            let Some(target) = relationships.get(&relationship_id) else {
                log::warn!(
                    "Sheet '{}' has no relationship target ({})",
                    name,
                    relationship_id
                );
                continue;
            };

            let path = resolve_target(target);
            match read_part(&mut archive, &path)? {
                Some(xml) => {
                    let cells = parse_worksheet_cells(&path, &xml)?;
                    cell_styles.insert(name, cells);
                }
                None => log::warn!("Worksheet part '{}' for sheet '{}' not found", path, name),
            }
        }

        Ok(Self {
            styles,
            cell_styles,
            is_1904,
        })
    }

    /// 1904年エポックを使用するかどうか
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// シートのワークシートXMLに現れる全セル
    pub fn styled_cells(&self, sheet_name: &str) -> &[StyledCell] {
        self.cell_styles
            .get(sheet_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// cellXfsインデックスからスタイルを解決
    pub fn resolve_style(&self, xf_index: usize) -> Style {
        self.styles.resolve(xf_index)
    }
}

/// アーカイブ内のパーツを読み込む（存在しない場合は`None`）
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, HouganshiError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(HouganshiError::Zip(e.to_string())),
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// リレーションシップのターゲットをアーカイブ内のパスに変換
///
/// 絶対指定（`/xl/worksheets/sheet1.xml`）は先頭の`/`を除き、
/// 相対指定（`worksheets/sheet1.xml`）は`xl/`からの相対パスとして扱います。
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// xl/workbook.xml の解析
///
/// シート名とリレーションシップIDの組（シート順）と、1904年エポックフラグを返します。
fn parse_workbook(xml: &[u8]) -> Result<(Vec<(String, String)>, bool), HouganshiError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut is_1904 = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    // <workbookPr date1904="1"/>
                    is_1904 = matches!(
                        attribute(WORKBOOK_PART, &e, b"date1904")?.as_deref(),
                        Some("1" | "true")
                    );
                }
                b"sheet" => {
                    // <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
                    let name = attribute(WORKBOOK_PART, &e, b"name")?;
                    let id = attribute(WORKBOOK_PART, &e, b"id")?;
                    match (name, id) {
                        (Some(name), Some(id)) => sheets.push((name, id)),
                        _ => log::warn!("Skipping <sheet> element without name or r:id"),
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(HouganshiError::xml(WORKBOOK_PART, e)),
            _ => {}
        }
    }

    Ok((sheets, is_1904))
}

/// リレーションシップパーツの解析（Id -> Target）
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, HouganshiError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let id = attribute(WORKBOOK_RELS_PART, &e, b"Id")?;
                    let target = attribute(WORKBOOK_RELS_PART, &e, b"Target")?;
                    if let (Some(id), Some(target)) = (id, target) {
                        relationships.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(HouganshiError::xml(WORKBOOK_RELS_PART, e)),
            _ => {}
        }
    }

    Ok(relationships)
}

/// ワークシートXMLから全セルの座標とスタイルインデックスを抽出
///
/// 値を持たないセル（`<c r="B2" s="3"/>`）も含みます。
/// `r`属性のないセルは同じ行の直前のセルの右隣として扱います。
fn parse_worksheet_cells(part: &str, xml: &[u8]) -> Result<Vec<StyledCell>, HouganshiError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut cells = Vec::new();
    let mut current_row: u32 = 0;
    let mut last_col: u32 = 0;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = match attribute(part, &e, b"r")? {
                        Some(r) => r.parse()?,
                        None => current_row + 1,
                    };
                    last_col = 0;
                }
                b"c" => {
                    let coord = match attribute(part, &e, b"r")? {
                        Some(reference) => match CellCoord::from_a1(&reference) {
                            Some(coord) => coord,
                            None => {
                                log::warn!("Invalid cell reference '{}' in {}", reference, part);
                                continue;
                            }
                        },
                        None => CellCoord::new(current_row.max(1), last_col + 1),
                    };
                    let style_index = match attribute(part, &e, b"s")? {
                        Some(s) => s.parse()?,
                        None => 0,
                    };

                    current_row = coord.row;
                    last_col = coord.col;
                    cells.push((coord, style_index));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(HouganshiError::xml(part, e)),
            _ => {}
        }
    }

    Ok(cells)
}
