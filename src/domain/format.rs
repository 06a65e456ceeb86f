//! Text ⇄ typed value helpers shared by the reader and the writer.

use crate::utils::error::ValidationError;
use crate::utils::validation::FieldResult;
use chrono::{NaiveDate, NaiveDateTime};

/// 會計匯入檔使用的日期格式
pub const DATE_FORMAT: &str = "%m/%d/%Y";
pub const DATE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

const SOURCE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// 解析派遣系統匯出的 ISO 8601 日期時間，純日期視為當天 00:00
pub fn parse_service_datetime(field: &str, value: &str) -> FieldResult<NaiveDateTime> {
    let text = value.trim();
    for format in SOURCE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            ValidationError::new(
                field,
                format!("'{}' is not an ISO 8601 date or date-time", text),
            )
        })
}

pub fn parse_flag(field: &str, value: &str) -> FieldResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(ValidationError::new(
            field,
            format!("'{}' is not a flag (expected 1 or 0)", other),
        )),
    }
}

pub fn parse_count(field: &str, value: &str) -> FieldResult<u32> {
    let text = value.trim();
    text.parse::<u32>().map_err(|_| {
        ValidationError::new(
            field,
            format!("'{}' is not a non-negative whole number", text),
        )
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(date_time: NaiveDateTime) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}
