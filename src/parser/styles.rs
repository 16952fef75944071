//! Styles Parser
//!
//! `xl/styles.xml`からフォント、塗りつぶし、罫線、セル書式（cellXfs）を抽出し、
//! スタイルインデックスを`Style`に解決します。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::HouganshiError;
use crate::parser::attribute;
use crate::types::{Alignment, Border, BorderKind, Borders, Style};

const STYLES_PART: &str = "xl/styles.xml";

/// フォント定義（`<font>`要素）
#[derive(Debug, Clone, Default, PartialEq)]
struct FontDef {
    size: Option<f64>,
    bold: bool,
    italic: bool,
    underline: bool,
    color: Option<String>,
}

/// 塗りつぶし定義（`<fill>`要素）
#[derive(Debug, Clone, Default, PartialEq)]
struct FillDef {
    pattern: Option<String>,
    foreground: Option<String>,
}

impl FillDef {
    /// パターンが`none`以外の場合の前景色
    fn background(&self) -> Option<String> {
        match self.pattern.as_deref() {
            Some("none") | None => None,
            Some(_) => self.foreground.clone(),
        }
    }
}

/// セル書式（`<cellXfs>`内の`<xf>`要素）
#[derive(Debug, Clone, Default, PartialEq)]
struct CellXf {
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
    alignment: Option<Alignment>,
}

/// 解析中のセクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Fonts,
    Fills,
    Borders,
    CellXfs,
    Other,
}

/// 罫線の辺
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// スタイルテーブル
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleTable {
    fonts: Vec<FontDef>,
    fills: Vec<FillDef>,
    borders: Vec<Borders>,
    cell_xfs: Vec<CellXf>,
}

impl StyleTable {
    /// styles.xmlの内容を解析
    pub fn parse(xml: &[u8]) -> Result<Self, HouganshiError> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut table = StyleTable::default();
        let mut buf = Vec::new();
        let mut section = Section::Outside;
        let mut side: Option<Side> = None;
        let mut in_xf = false;
        // ルート要素（styleSheet）からの深さ
        let mut depth = 0usize;

        loop {
            buf.clear();
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| HouganshiError::xml(STYLES_PART, e))?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let name = e.local_name();

                    if depth == 1 {
                        section = match name.as_ref() {
                            b"fonts" => Section::Fonts,
                            b"fills" => Section::Fills,
                            b"borders" => Section::Borders,
                            b"cellXfs" => Section::CellXfs,
                            _ => Section::Other,
                        };
                    }
                    if !is_empty {
                        depth += 1;
                    }

                    match (section, name.as_ref()) {
                        (Section::Fonts, b"font") => table.fonts.push(FontDef::default()),
                        (Section::Fonts, tag) => {
                            if let Some(font) = table.fonts.last_mut() {
                                apply_font_property(font, tag, e)?;
                            }
                        }

                        (Section::Fills, b"fill") => table.fills.push(FillDef::default()),
                        (Section::Fills, b"patternFill") => {
                            if let Some(fill) = table.fills.last_mut() {
                                fill.pattern = attr_value(e, b"patternType")?;
                            }
                        }
                        (Section::Fills, b"fgColor") => {
                            if let Some(fill) = table.fills.last_mut() {
                                fill.foreground = color_attr(e)?;
                            }
                        }

                        (Section::Borders, b"border") => table.borders.push(Borders::default()),
                        (Section::Borders, b"left" | b"start") => {
                            side = Self::begin_side(&mut table, Side::Left, e, is_empty)?
                        }
                        (Section::Borders, b"right" | b"end") => {
                            side = Self::begin_side(&mut table, Side::Right, e, is_empty)?
                        }
                        (Section::Borders, b"top") => {
                            side = Self::begin_side(&mut table, Side::Top, e, is_empty)?
                        }
                        (Section::Borders, b"bottom") => {
                            side = Self::begin_side(&mut table, Side::Bottom, e, is_empty)?
                        }
                        (Section::Borders, b"color") => {
                            if let (Some(current), Some(borders)) = (side, table.borders.last_mut())
                            {
                                side_mut(borders, current).color = color_attr(e)?;
                            }
                        }

                        (Section::CellXfs, b"xf") => {
                            table.cell_xfs.push(CellXf {
                                font_id: index_attr(e, b"fontId")?,
                                fill_id: index_attr(e, b"fillId")?,
                                border_id: index_attr(e, b"borderId")?,
                                alignment: None,
                            });
                            in_xf = !is_empty;
                        }
                        (Section::CellXfs, b"alignment") if in_xf => {
                            if let Some(xf) = table.cell_xfs.last_mut() {
                                xf.alignment = Some(parse_alignment(e)?);
                            }
                        }

                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    depth = depth.saturating_sub(1);
                    if depth <= 1 {
                        section = Section::Outside;
                    }
                    match e.local_name().as_ref() {
                        b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom" => side = None,
                        b"xf" => in_xf = false,
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::trace!(
            "Parsed styles: {} fonts, {} fills, {} borders, {} cellXfs",
            table.fonts.len(),
            table.fills.len(),
            table.borders.len(),
            table.cell_xfs.len()
        );

        Ok(table)
    }

    /// 罫線の辺の開始（内部ヘルパー）
    ///
    /// 子要素（`<color>`）を持つ場合は、その辺を現在の辺として返します。
    fn begin_side(
        table: &mut StyleTable,
        current: Side,
        e: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<Option<Side>, HouganshiError> {
        if let Some(borders) = table.borders.last_mut() {
            let kind = match attr_value(e, b"style")? {
                Some(style) => border_kind(&style),
                None => BorderKind::None,
            };
            *side_mut(borders, current) = Border::new(kind);
        }
        Ok(if is_empty { None } else { Some(current) })
    }

    /// セル書式インデックスからスタイルを解決
    ///
    /// 範囲外のインデックスは警告を出してデフォルトスタイルを返します。
    pub fn resolve(&self, xf_index: usize) -> Style {
        if self.cell_xfs.is_empty() {
            return Style::default();
        }

        let Some(xf) = self.cell_xfs.get(xf_index) else {
            log::warn!(
                "Style index {} out of range ({} cellXfs)",
                xf_index,
                self.cell_xfs.len()
            );
            return Style::default();
        };

        let mut style = Style::default();

        if let Some(font) = xf.font_id.and_then(|id| self.fonts.get(id)) {
            style.font_size = font.size;
            style.bold = font.bold;
            style.italic = font.italic;
            style.underline = font.underline;
            style.font_color = font.color.clone();
        }

        if let Some(fill) = xf.fill_id.and_then(|id| self.fills.get(id)) {
            style.background_color = fill.background();
        }

        if let Some(borders) = xf.border_id.and_then(|id| self.borders.get(id)) {
            style.borders = borders.clone();
        }

        style.alignment = xf.alignment.clone();
        style
    }
}

fn side_mut(borders: &mut Borders, side: Side) -> &mut Border {
    match side {
        Side::Top => &mut borders.top,
        Side::Bottom => &mut borders.bottom,
        Side::Left => &mut borders.left,
        Side::Right => &mut borders.right,
    }
}

/// フォントの子要素を反映
fn apply_font_property(
    font: &mut FontDef,
    tag: &[u8],
    e: &BytesStart<'_>,
) -> Result<(), HouganshiError> {
    match tag {
        b"b" => font.bold = flag_attr(e)?,
        b"i" => font.italic = flag_attr(e)?,
        b"u" => {
            font.underline = !matches!(attr_value(e, b"val")?.as_deref(), Some("none"));
        }
        b"sz" => {
            if let Some(size) = attr_value(e, b"val")? {
                font.size = Some(size.parse()?);
            }
        }
        b"color" => font.color = color_attr(e)?,
        _ => {}
    }
    Ok(())
}

fn parse_alignment(e: &BytesStart<'_>) -> Result<Alignment, HouganshiError> {
    Ok(Alignment {
        horizontal: attr_value(e, b"horizontal")?,
        vertical: attr_value(e, b"vertical")?,
        wrap_text: matches!(attr_value(e, b"wrapText")?.as_deref(), Some("1" | "true")),
    })
}

/// 罫線スタイル名を罫線の種類に変換
pub(crate) fn border_kind(style: &str) -> BorderKind {
    match style {
        "none" => BorderKind::None,
        "thin" => BorderKind::Thin,
        "medium" => BorderKind::Medium,
        "thick" => BorderKind::Thick,
        "double" => BorderKind::Double,
        "dotted" | "hair" => BorderKind::Dotted,
        "dashed" | "dashDot" | "dashDotDot" | "mediumDashed" | "mediumDashDot"
        | "mediumDashDotDot" | "slantDashDot" => BorderKind::Dashed,
        other => {
            log::warn!("Unknown border style '{}', treating as thin", other);
            BorderKind::Thin
        }
    }
}

/// `AARRGGBB`または`RRGGBB`形式の色を`#RRGGBB`に変換
///
/// テーマ色・インデックス色（`rgb`属性なし）は`None`です。
pub(crate) fn normalize_rgb(rgb: &str) -> Option<String> {
    let hex = match rgb.len() {
        8 => &rgb[2..],
        6 => rgb,
        _ => return None,
    };
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_uppercase()))
}

fn color_attr(e: &BytesStart<'_>) -> Result<Option<String>, HouganshiError> {
    Ok(attr_value(e, b"rgb")?.and_then(|rgb| normalize_rgb(&rgb)))
}

/// `<b/>`や`<b val="0"/>`の真偽値
fn flag_attr(e: &BytesStart<'_>) -> Result<bool, HouganshiError> {
    Ok(!matches!(
        attr_value(e, b"val")?.as_deref(),
        Some("0" | "false")
    ))
}

fn index_attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<usize>, HouganshiError> {
    match attr_value(e, key)? {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, HouganshiError> {
    attribute(STYLES_PART, e, key)
}
