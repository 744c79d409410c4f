// RoboTrace - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::core::labels::{ChargeState, DriveState};
use crate::util::constants;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Cell values (raw output of the tabular reader)
// =============================================================================

/// One raw cell as delivered by the workbook/CSV reader.
///
/// Spreadsheet date cells arrive as `Number` (the serial date). CSV cells
/// always arrive as `Text`. Blank cells are `Empty`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// True for values the telemetry export uses to mean "no data":
    /// an empty cell, empty text, zero/NaN, or `false`.
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Text(s) => s.is_empty(),
            CellValue::Bool(b) => !b,
        }
    }

    /// Numeric coercion. Unparseable text and empty cells become NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Empty => f64::NAN,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            CellValue::Bool(true) => 1.0,
            CellValue::Bool(false) => 0.0,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => f.write_str(constants::PLACEHOLDER),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Render a number the way a spreadsheet shows it: integral values
/// without a fractional part, everything else in shortest form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// =============================================================================
// Row (input unit)
// =============================================================================

/// One telemetry sample, keyed by the fixed column contract.
///
/// Only `timestamp`, `drive` and `charge` drive event detection; the rest
/// is contextual annotation. Missing columns are `CellValue::Empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub timestamp: CellValue,
    pub drive: CellValue,
    pub charge: CellValue,
    pub service_mode: CellValue,
    pub x: CellValue,
    pub y: CellValue,
    pub service: CellValue,
}

impl Row {
    /// Build a row from a header-keyed record. Columns outside the contract
    /// are ignored.
    pub fn from_record(mut record: HashMap<String, CellValue>) -> Self {
        let mut take = |col: &str| record.remove(col).unwrap_or_default();
        Self {
            timestamp: take(constants::COL_TIME),
            drive: take(constants::COL_DRIVE),
            charge: take(constants::COL_CHARGE),
            service_mode: take(constants::COL_SERVICE_MODE),
            x: take(constants::COL_X),
            y: take(constants::COL_Y),
            service: take(constants::COL_SERVICE),
        }
    }
}

// =============================================================================
// ParsedRow (per-row, ephemeral)
// =============================================================================

/// Normalised view of a `Row`, produced fresh for every row by the
/// normaliser and dropped once the row has been folded into the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// Calendar time, present only when the raw timestamp parsed.
    pub parsed_time: Option<NaiveDateTime>,

    /// Text used as the event-line prefix: the formatted parsed time, or
    /// the raw cell text when parsing failed.
    pub display_time: String,

    pub drive: DriveState,
    pub charge: ChargeState,

    /// `(위치: x, y | 서비스: tag)` annotation, built after truncation.
    pub location: String,

    /// Whether the row passes the timestamp gate for the active mode.
    pub has_valid_time_format: bool,
}

// =============================================================================
// Timeline events (output unit)
// =============================================================================

/// The kind of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    FormatError,
    TimeRegression,
    CollectionGap,
    DriveChange,
    ChargeChange,
    End,
}

impl EventKind {
    /// Short label for logs and JSON consumers.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::FormatError => "format-error",
            EventKind::TimeRegression => "time-regression",
            EventKind::CollectionGap => "gap",
            EventKind::DriveChange => "drive-change",
            EventKind::ChargeChange => "charge-change",
            EventKind::End => "end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One formatted timeline line plus its kind.
///
/// Events are append-only and ordered by row-processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub kind: EventKind,
    pub line: String,
}

impl TimelineEvent {
    pub fn new(kind: EventKind, line: String) -> Self {
        Self { kind, line }
    }
}

// =============================================================================
// Scan progress
// =============================================================================

/// Progress notification emitted by the timeline builder.
///
/// Purely observational: the scan never reads anything back from the
/// receiver, so progress handling cannot change the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub rows_processed: usize,
    pub total_rows: usize,
}

impl ScanProgress {
    /// Whole percent complete (0-100).
    pub fn percent(&self) -> usize {
        if self.total_rows == 0 {
            100
        } else {
            self.rows_processed * 100 / self.total_rows
        }
    }
}
