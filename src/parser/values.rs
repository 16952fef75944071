//! セル値の変換
//!
//! calamineのセル値をシートモデルの`CellValue`に変換します。
//! 日時はワークブックの日付システム（1900年/1904年）に従ってISO 8601文字列にします。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::CellValue;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// calamineのセル値を変換
pub(crate) fn cell_value(data: &Data, is_1904: bool) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match excel_serial_to_iso(serial, is_1904) {
                Some(iso) => CellValue::Text(iso),
                None => {
                    log::warn!("Date serial {} is out of range, keeping as number", serial);
                    CellValue::Number(serial)
                }
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Empty => CellValue::Empty,
    }
}

/// Excelのシリアル値をISO 8601形式（`YYYY-MM-DDTHH:MM:SS.mmmZ`）に変換
///
/// - 1900年システム: 1899年12月30日起算。Excelが1900年を閏年として扱うため、
///   シリアル値60未満は1日ずらして1899年12月31日起算とします（1 = 1900-01-01）。
/// - 1904年システム: 1904年1月1日起算（0 = 1904-01-01）
///
/// 範囲外の値は`None`を返します。
pub(crate) fn excel_serial_to_iso(serial: f64, is_1904: bool) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }

    let epoch = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let epoch: NaiveDateTime = epoch.and_hms_opt(0, 0, 0)?;

    let millis = (serial * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    let datetime = epoch.checked_add_signed(Duration::try_milliseconds(millis as i64)?)?;

    Some(datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
