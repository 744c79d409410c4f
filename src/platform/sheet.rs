// RoboTrace - platform/sheet.rs
//
// Tabular input reading: turns the first worksheet of a workbook (via
// calamine) or a CSV file (via csv) into header-keyed `Row` values.
//
// Conventions:
//   - The first row is the header row; header text is matched exactly.
//   - Blank cells become `CellValue::Empty`; fully blank rows are dropped.
//   - Spreadsheet date cells are handed on as their serial number so the
//     normaliser sees the same value a spreadsheet formula would.

use crate::core::model::{CellValue, Row};
use crate::core::normalize;
use crate::util::error::SheetError;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;

/// Supported input kinds, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Workbook,
    Csv,
}

impl SheetKind {
    /// Classify `path` by extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, SheetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            _ => Err(SheetError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Read every data row of `path`.
pub fn read_rows(path: &Path) -> Result<Vec<Row>, SheetError> {
    let rows = match SheetKind::from_path(path)? {
        SheetKind::Workbook => read_workbook(path)?,
        SheetKind::Csv => read_csv(path)?,
    };
    tracing::debug!(path = %path.display(), rows = rows.len(), "Rows read");
    Ok(rows)
}

// =============================================================================
// Workbook
// =============================================================================

fn read_workbook(path: &Path) -> Result<Vec<Row>, SheetError> {
    let wrap = |source| SheetError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(wrap)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetError::NoWorksheet {
            path: path.to_path_buf(),
        })?;

    tracing::debug!(path = %path.display(), sheet = %first, "Reading first worksheet");
    let range = workbook.worksheet_range(&first).map_err(wrap)?;

    let mut grid = range.rows();
    let Some(header_row) = grid.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    Ok(grid
        .filter_map(|cells| build_row(&headers, cells.iter().map(cell_from_data)))
        .collect())
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Map a calamine cell onto the reader-neutral `CellValue`.
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::DateTimeIso(s) => iso_date_cell(s),
        Data::String(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Formula errors (#DIV/0! and friends) stay visible as text.
        other => CellValue::Text(other.to_string()),
    }
}

/// OpenDocument date cells carry ISO 8601 text instead of a serial number.
/// Re-encode them as serials so every workbook format reaches the
/// normaliser the same way; text that does not decode is kept as is.
fn iso_date_cell(raw: &str) -> CellValue {
    const ISO_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    let decoded = ISO_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    match decoded {
        Some(ts) => CellValue::Number(normalize::serial_date_from(ts)),
        None => {
            tracing::debug!(value = raw, "Undecodable ISO date cell kept as text");
            CellValue::Text(raw.to_string())
        }
    }
}

// =============================================================================
// CSV
// =============================================================================

fn read_csv(path: &Path) -> Result<Vec<Row>, SheetError> {
    let wrap = |source| SheetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(wrap)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(wrap)?
        .iter()
        // Spreadsheet tools often prefix CSV exports with a UTF-8 BOM.
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(wrap)?;
        let cells = record.iter().map(|field| {
            if field.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(field.to_string())
            }
        });
        if let Some(row) = build_row(&headers, cells) {
            rows.push(row);
        }
    }
    Ok(rows)
}

// =============================================================================
// Shared
// =============================================================================

/// Zip header names with cell values; `None` for a fully blank row.
fn build_row(headers: &[String], cells: impl Iterator<Item = CellValue>) -> Option<Row> {
    let record: HashMap<String, CellValue> = headers
        .iter()
        .zip(cells)
        .filter(|(name, value)| !name.is_empty() && *value != CellValue::Empty)
        .map(|(name, value)| (name.clone(), value))
        .collect();

    if record.is_empty() {
        None
    } else {
        Some(Row::from_record(record))
    }
}
