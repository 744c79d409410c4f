// RoboTrace - core/normalize.rs
//
// Per-row parsing and validation: timestamp decoding (serial dates and
// text), strict timestamp-format checks, coordinate formatting, and
// service-tag truncation.
// Core layer: pure functions over `Row` values, no I/O.

use crate::core::labels::{ChargeState, DriveState};
use crate::core::model::{CellValue, ParsedRow, Row};
use crate::core::timeline::TimelineConfig;
use crate::util::constants;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

// =============================================================================
// Timestamps
// =============================================================================

/// Decode a raw timestamp cell.
///
/// Numbers are spreadsheet serial dates (days since 1899-12-30) and are
/// converted to the millisecond, rounding to nearest. Text goes through a
/// tolerant multi-format parse. Absent values (empty, zero, false) and
/// unparseable input yield `None`.
pub fn parse_timestamp(raw: &CellValue) -> Option<NaiveDateTime> {
    if raw.is_absent() {
        return None;
    }
    match raw {
        CellValue::Number(serial) => parse_serial_date(*serial),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Convert a spreadsheet serial date to a calendar timestamp.
fn parse_serial_date(serial: f64) -> Option<NaiveDateTime> {
    let millis = ((serial - constants::SERIAL_DATE_UNIX_OFFSET_DAYS) * constants::MS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

/// Encode a calendar timestamp as a spreadsheet serial date.
/// `parse_timestamp` maps the result back to the same instant.
pub fn serial_date_from(ts: NaiveDateTime) -> f64 {
    let millis = ts.and_utc().timestamp_millis() as f64;
    millis / constants::MS_PER_DAY + constants::SERIAL_DATE_UNIX_OFFSET_DAYS
}

/// Tolerant text parse, tried from most to least specific.
///
/// Wall-clock time is kept as written: offsets in RFC 3339 input are not
/// applied, so text and serial inputs land on the same naive timeline.
fn parse_date_text(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y.%m.%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(ndt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for fmt in DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(trimmed, fmt) {
            return nd.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// True when `s` is exactly `YYYY-MM-DD HH:MM:SS` and names a real
/// calendar instant (so `2025-02-30 10:00:00` is rejected).
pub fn is_strict_timestamp_format(s: &str) -> bool {
    static STRICT: OnceLock<Regex> = OnceLock::new();
    let re = STRICT.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$")
            .expect("is_strict_timestamp_format: invalid regex")
    });
    re.is_match(s) && NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
}

/// Strict gate used by the anomaly-aware mode.
///
/// Serial dates skip the textual check but must still decode; text must
/// pass `is_strict_timestamp_format`; everything else fails.
fn passes_strict_gate(raw: &CellValue) -> bool {
    match raw {
        CellValue::Number(_) => parse_timestamp(raw).is_some(),
        CellValue::Text(s) => is_strict_timestamp_format(s),
        CellValue::Empty | CellValue::Bool(_) => false,
    }
}

// =============================================================================
// Annotation fields
// =============================================================================

/// Format a coordinate with two decimals, or `-` when the cell is empty.
/// Unparseable text renders as `NaN`, matching numeric coercion.
pub fn normalize_coordinate(raw: &CellValue) -> String {
    match raw {
        CellValue::Empty => constants::PLACEHOLDER.to_string(),
        other => format!("{:.2}", other.as_number()),
    }
}

/// Cut an oversized free-text field to `keep_len` characters plus an
/// ellipsis. Lengths count characters, not bytes.
pub fn truncate_service_field(raw: &str, max_len: usize, keep_len: usize) -> Cow<'_, str> {
    if raw.chars().count() > max_len {
        let kept: String = raw.chars().take(keep_len).collect();
        Cow::Owned(format!("{kept}{}", constants::ELLIPSIS))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Text of an optional annotation cell, `-` when absent.
fn annotation_text(raw: &CellValue) -> String {
    if raw.is_absent() {
        constants::PLACEHOLDER.to_string()
    } else {
        raw.to_string()
    }
}

/// Build the `(위치: x, y | 서비스: tag)` annotation.
///
/// The service tag is truncated first, so the annotation is assembled
/// exactly once from already-bounded parts.
pub fn location_annotation(row: &Row, config: &TimelineConfig) -> String {
    let x = normalize_coordinate(&row.x);
    let y = normalize_coordinate(&row.y);
    let service_raw = annotation_text(&row.service);
    let service =
        truncate_service_field(&service_raw, config.service_max_len, config.service_keep_len);

    if config.annotate_service_mode {
        let mode = annotation_text(&row.service_mode);
        format!("(위치: {x}, {y} | 모드: {mode} | 서비스: {service})")
    } else {
        format!("(위치: {x}, {y} | 서비스: {service})")
    }
}

// =============================================================================
// Row normalisation
// =============================================================================

/// Normalise one row for the active timeline mode.
pub fn normalize_row(row: &Row, config: &TimelineConfig) -> ParsedRow {
    let parsed_time = parse_timestamp(&row.timestamp);

    let has_valid_time_format = if config.strict_timestamps {
        passes_strict_gate(&row.timestamp)
    } else {
        !row.timestamp.is_absent()
    };

    let display_time = match parsed_time {
        Some(ts) => ts.format(constants::DISPLAY_TIME_FORMAT).to_string(),
        None => row.timestamp.to_string(),
    };

    ParsedRow {
        parsed_time,
        display_time,
        drive: DriveState::from_cell(&row.drive),
        charge: ChargeState::from_cell(&row.charge),
        location: location_annotation(row, config),
        has_valid_time_format,
    }
}
