//! Parser Module
//!
//! XLSXワークブックをシートモデル（`Sheet`）にデコードするモジュール。
//! セル値・数式・結合範囲はcalamine、スタイルはXMLパーツから直接取得します。

mod metadata;
mod styles;
mod values;
mod workbook;

use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;

use crate::error::HouganshiError;

pub(crate) use metadata::XlsxMetadataParser;
pub use workbook::WorkbookDecoder;

/// 属性値を取得（名前空間プレフィックスを除いたローカル名で比較）
pub(crate) fn attribute(
    part: &str,
    e: &BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, HouganshiError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| HouganshiError::xml(part, err))?;
        if attr.key.local_name().as_ref() == key {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw).map_err(|err| HouganshiError::xml(part, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
