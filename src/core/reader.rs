use crate::domain::model::{columns, RawTowRow, TowTicket};
use crate::utils::error::{ConversionError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// 讀取拖曳票 CSV，遇到第一個錯誤列即中止
pub fn read_from_tow_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TowTicket>> {
    let path = path.as_ref();
    tracing::debug!("Reading tow tickets from {}", path.display());

    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConversionError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => ConversionError::FileRead {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| ConversionError::Csv {
            path: path.to_path_buf(),
            row: 0,
            source,
        })?
        .clone();
    let headers = check_headers(path, &headers)?;
    reader.set_headers(headers);

    let mut tickets = Vec::new();
    for (index, result) in reader.deserialize::<RawTowRow>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|source| ConversionError::Csv {
            path: path.to_path_buf(),
            row,
            source,
        })?;
        let ticket = TowTicket::parse(&raw).map_err(|e| e.at_row(row))?;
        tracing::debug!("Row {}: {}", row, ticket);
        tickets.push(ticket);
    }

    tracing::info!("Read {} tow tickets from {}", tickets.len(), path.display());
    Ok(tickets)
}

/// 清理標題 (去 BOM 與空白) 並檢查必要欄位
fn check_headers(path: &Path, headers: &StringRecord) -> Result<StringRecord> {
    let schema_error = |message: String| ConversionError::Schema {
        path: path.to_path_buf(),
        message,
    };

    let cleaned: StringRecord = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();

    if cleaned.is_empty() || cleaned.iter().all(str::is_empty) {
        return Err(schema_error("file is empty or has no header row".to_string()));
    }

    // 匯出檔常有結尾逗號，最後的空白欄名略過不檢查
    let named = cleaned
        .iter()
        .collect::<Vec<&str>>()
        .iter()
        .rposition(|h| !h.is_empty())
        .map_or(0, |last| last + 1);

    if let Some(position) = cleaned.iter().take(named).position(str::is_empty) {
        return Err(schema_error(format!(
            "header column {} has no name",
            position + 1
        )));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = cleaned.iter().take(named).find(|h| !seen.insert(*h)) {
        return Err(schema_error(format!("duplicate column '{}'", duplicate)));
    }

    let missing: Vec<&str> = columns::REQUIRED
        .iter()
        .copied()
        .filter(|required| !seen.contains(required))
        .collect();
    if !missing.is_empty() {
        return Err(schema_error(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    Ok(cleaned)
}
