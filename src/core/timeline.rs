// RoboTrace - core/timeline.rs
//
// Sequential event detection over time-ordered telemetry rows.
//
// The scan is an explicit fold: `scan_row` takes the previous `ScanState`
// by value and returns the next one, so each invocation owns its state and
// nothing survives between scans. Row order is the ordering authority;
// rows are never re-sorted by timestamp.
//
// Both the simple pass and the anomaly-aware pass are the same algorithm
// with different `TimelineConfig` toggles.

use crate::core::labels::{ChargeState, DriveState};
use crate::core::model::{CellValue, EventKind, Row, ScanProgress, TimelineEvent};
use crate::core::normalize;
use crate::util::constants;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Configuration
// =============================================================================

/// The two scan flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineMode {
    /// State transitions only; rows without a timestamp are dropped silently.
    Simple,
    /// Strict timestamp validation, gap/regression detection, end marker.
    #[default]
    AnomalyAware,
}

impl TimelineMode {
    pub fn label(&self) -> &'static str {
        match self {
            TimelineMode::Simple => "simple",
            TimelineMode::AnomalyAware => "anomaly",
        }
    }
}

impl fmt::Display for TimelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimelineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(TimelineMode::Simple),
            "anomaly" | "anomaly-aware" => Ok(TimelineMode::AnomalyAware),
            other => Err(format!(
                "unknown timeline mode '{other}' (expected \"simple\" or \"anomaly\")"
            )),
        }
    }
}

/// Toggles and limits for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    pub mode: TimelineMode,

    /// Reject rows whose timestamp is not strict `YYYY-MM-DD HH:MM:SS`
    /// (or a decodable serial date), logging them as format errors.
    pub strict_timestamps: bool,

    /// Emit time-regression and collection-gap events.
    pub detect_time_anomalies: bool,

    /// Emit an end marker on the last row.
    pub emit_end_marker: bool,

    /// Include the service-mode column in the location annotation.
    pub annotate_service_mode: bool,

    /// Elapsed time at or above which a collection gap is reported.
    pub gap_threshold_ms: i64,

    /// Event-list cap applied by the report assembler.
    pub max_events: usize,

    /// Service-tag length above which the tag is truncated.
    pub service_max_len: usize,

    /// Characters kept from a truncated service tag.
    pub service_keep_len: usize,
}

impl TimelineConfig {
    /// Defaults for the given mode.
    pub fn for_mode(mode: TimelineMode) -> Self {
        let gap_threshold_ms = constants::DEFAULT_GAP_THRESHOLD_SECS * 1_000;
        match mode {
            TimelineMode::Simple => Self {
                mode,
                strict_timestamps: false,
                detect_time_anomalies: false,
                emit_end_marker: false,
                annotate_service_mode: false,
                gap_threshold_ms,
                max_events: constants::SIMPLE_MAX_EVENTS,
                service_max_len: constants::SIMPLE_SERVICE_MAX_LEN,
                service_keep_len: constants::SIMPLE_SERVICE_KEEP_LEN,
            },
            TimelineMode::AnomalyAware => Self {
                mode,
                strict_timestamps: true,
                detect_time_anomalies: true,
                emit_end_marker: true,
                annotate_service_mode: true,
                gap_threshold_ms,
                max_events: constants::ANOMALY_MAX_EVENTS,
                service_max_len: constants::ANOMALY_SERVICE_MAX_LEN,
                service_keep_len: constants::ANOMALY_SERVICE_KEEP_LEN,
            },
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::for_mode(TimelineMode::default())
    }
}

// =============================================================================
// Scan state
// =============================================================================

/// Accumulator threaded through the scan, one instance per invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanState {
    pub previous_drive: Option<DriveState>,
    pub previous_charge: Option<ChargeState>,
    /// Last accepted timestamp. Never advanced by a regressed row.
    pub previous_time: Option<NaiveDateTime>,
    pub skipped_rows: usize,
    pub events: Vec<TimelineEvent>,
}

/// Final product of a scan, before capping and formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub events: Vec<TimelineEvent>,
}

// =============================================================================
// The fold
// =============================================================================

/// Fold one row into the scan state.
///
/// `index` is the row's position in the input and `total` the input length;
/// together they decide the start and end markers.
pub fn scan_row(
    mut state: ScanState,
    row: &Row,
    index: usize,
    total: usize,
    config: &TimelineConfig,
) -> ScanState {
    let parsed = normalize::normalize_row(row, config);

    // Timestamp gate. Previous-state variables stay untouched for rejected rows.
    if !parsed.has_valid_time_format {
        if config.strict_timestamps {
            state.events.push(format_error_event(&row.timestamp, index));
            state.skipped_rows += 1;
        }
        return state;
    }

    let ts = parsed.display_time.as_str();

    if index == 0 {
        state.events.push(TimelineEvent::new(
            EventKind::Start,
            format!(
                "[{ts}] >> 분석 시작 (초기상태: {}, {}, {})",
                parsed.drive, parsed.charge, parsed.location
            ),
        ));
    }

    if config.detect_time_anomalies {
        if let (Some(current), Some(previous)) = (parsed.parsed_time, state.previous_time) {
            let delta_ms = (current - previous).num_milliseconds();
            if delta_ms < 0 {
                state.events.push(TimelineEvent::new(
                    EventKind::TimeRegression,
                    format!(
                        "[{ts}] !! 시간 역행 감지: 이전 {} ➔ 현재 {ts} ({} 역행)",
                        display(previous),
                        format_duration(-delta_ms)
                    ),
                ));
                // A regressed sample neither transitions state nor moves the baseline.
                return state;
            }
            if delta_ms >= config.gap_threshold_ms {
                state.events.push(TimelineEvent::new(
                    EventKind::CollectionGap,
                    format!(
                        "[{ts}] !! 수집 공백 감지: {} 이후 {} 동안 데이터 없음",
                        display(previous),
                        format_duration(delta_ms)
                    ),
                ));
            }
        }
    }

    if let Some(previous) = &state.previous_drive {
        if *previous != parsed.drive {
            state.events.push(TimelineEvent::new(
                EventKind::DriveChange,
                format!(
                    "[{ts}] 주행 상태 변경: {previous} ➔ {} {}",
                    parsed.drive, parsed.location
                ),
            ));
        }
    }

    if let Some(previous) = &state.previous_charge {
        if *previous != parsed.charge {
            state.events.push(TimelineEvent::new(
                EventKind::ChargeChange,
                format!(
                    "[{ts}] 충전 상태 변경: {previous} ➔ {} {}",
                    parsed.charge, parsed.location
                ),
            ));
        }
    }

    if config.emit_end_marker && index + 1 == total {
        state.events.push(TimelineEvent::new(
            EventKind::End,
            format!(
                "[{ts}] << 분석 종료 (최종상태: {}, {}, {})",
                parsed.drive, parsed.charge, parsed.location
            ),
        ));
    }

    if let Some(current) = parsed.parsed_time {
        state.previous_time = Some(current);
    }
    state.previous_drive = Some(parsed.drive);
    state.previous_charge = Some(parsed.charge);
    state
}

/// Run the full scan, reporting progress roughly every 10% of rows.
pub fn build_timeline<F>(rows: &[Row], config: &TimelineConfig, mut on_progress: F) -> ScanOutcome
where
    F: FnMut(ScanProgress),
{
    let total = rows.len();
    let step = (total * constants::PROGRESS_STEP_PERCENT / 100).max(1);

    let mut state = ScanState::default();
    for (index, row) in rows.iter().enumerate() {
        state = scan_row(state, row, index, total, config);

        let processed = index + 1;
        if processed % step == 0 || processed == total {
            on_progress(ScanProgress {
                rows_processed: processed,
                total_rows: total,
            });
        }
    }

    ScanOutcome {
        total_rows: total,
        skipped_rows: state.skipped_rows,
        events: state.events,
    }
}

/// `build_timeline` without progress reporting.
pub fn scan(rows: &[Row], config: &TimelineConfig) -> ScanOutcome {
    build_timeline(rows, config, |_| {})
}

// =============================================================================
// Formatting helpers
// =============================================================================

/// Rejected rows are quoted exactly as the cell held them.
fn format_error_event(raw_time: &CellValue, index: usize) -> TimelineEvent {
    let raw = raw_time.to_string();
    TimelineEvent::new(
        EventKind::FormatError,
        format!(
            "[{raw}] !! 시간 형식 오류: '{raw}' ({}번째 행 건너뜀)",
            index + 1
        ),
    )
}

fn display(ts: NaiveDateTime) -> String {
    ts.format(constants::DISPLAY_TIME_FORMAT).to_string()
}

/// Render a duration as `H시간 M분 S초`, or `M분 S초` when under an hour.
/// Sub-second remainders are dropped.
pub fn format_duration(ms: i64) -> String {
    let total_secs = ms / 1_000;
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}시간 {minutes}분 {seconds}초")
    } else {
        format!("{minutes}분 {seconds}초")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::CellValue;

    fn row(ts: &str, drive: f64, charge: &str) -> Row {
        Row {
            timestamp: CellValue::Text(ts.to_string()),
            drive: CellValue::Number(drive),
            charge: CellValue::Text(charge.to_string()),
            ..Row::default()
        }
    }

    fn kinds(outcome: &ScanOutcome) -> Vec<EventKind> {
        outcome.events.iter().map(|e| e.kind).collect()
    }

    fn anomaly() -> TimelineConfig {
        TimelineConfig::for_mode(TimelineMode::AnomalyAware)
    }

    fn simple() -> TimelineConfig {
        TimelineConfig::for_mode(TimelineMode::Simple)
    }

    // -------------------------------------------------------------------------
    // Duration formatting
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_duration_without_hours() {
        assert_eq!(format_duration(330_000), "5분 30초");
        assert_eq!(format_duration(999), "0분 0초");
    }

    #[test]
    fn test_format_duration_with_hours() {
        assert_eq!(format_duration(3_723_000), "1시간 2분 3초");
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    #[test]
    fn test_drive_change_between_two_rows() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11 10:00:10", 2.0, "false"),
        ];
        for config in [simple(), anomaly()] {
            let outcome = scan(&rows, &config);
            let drive: Vec<_> = outcome
                .events
                .iter()
                .filter(|e| e.kind == EventKind::DriveChange)
                .collect();
            assert_eq!(drive.len(), 1, "mode {}", config.mode);
            assert!(drive[0].line.contains("주행중(Run) ➔ 주행 완료"));
            assert!(!kinds(&outcome).contains(&EventKind::ChargeChange));
        }
    }

    #[test]
    fn test_charge_change_is_case_insensitive() {
        let rows = vec![
            row("2025-12-11 10:00:00", 0.0, "TRUE"),
            row("2025-12-11 10:00:10", 0.0, "true"),
            row("2025-12-11 10:00:20", 0.0, "False"),
        ];
        let outcome = scan(&rows, &simple());
        assert_eq!(kinds(&outcome), vec![EventKind::Start, EventKind::ChargeChange]);
        assert!(outcome.events[1].line.contains("충전중 ➔ 미충전"));
    }

    #[test]
    fn test_unknown_codes_render_verbatim() {
        let rows = vec![
            row("2025-12-11 10:00:00", 0.0, "false"),
            row("2025-12-11 10:00:10", 42.0, "maybe"),
        ];
        let outcome = scan(&rows, &simple());
        let lines: Vec<_> = outcome.events.iter().map(|e| e.line.as_str()).collect();
        assert!(lines[1].contains("대기(Stop) ➔ unknown(42)"));
        assert!(lines[2].contains("미충전 ➔ unknown(maybe)"));
    }

    // -------------------------------------------------------------------------
    // Temporal anomalies
    // -------------------------------------------------------------------------

    #[test]
    fn test_gap_reported_on_third_row() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11 10:00:30", 1.0, "false"),
            row("2025-12-11 10:06:00", 1.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(
            kinds(&outcome),
            vec![EventKind::Start, EventKind::CollectionGap, EventKind::End]
        );
        let gap = &outcome.events[1].line;
        assert!(gap.starts_with("[2025-12-11 10:06:00]"));
        assert!(gap.contains("2025-12-11 10:00:30 이후"));
        assert!(gap.contains("5분 30초"));
    }

    #[test]
    fn test_gap_threshold_is_inclusive() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11 10:05:00", 1.0, "false"),
            row("2025-12-11 10:09:59", 1.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        let gaps = kinds(&outcome)
            .into_iter()
            .filter(|k| *k == EventKind::CollectionGap)
            .count();
        assert_eq!(gaps, 1, "exactly 5 minutes is a gap, 4:59 is not");
    }

    #[test]
    fn test_regression_suppresses_transitions() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11 09:59:00", 2.0, "true"),
            row("2025-12-11 10:00:30", 1.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(
            kinds(&outcome),
            vec![EventKind::Start, EventKind::TimeRegression, EventKind::End]
        );
        let regression = &outcome.events[1].line;
        assert!(regression.contains("이전 2025-12-11 10:00:00"));
        assert!(regression.contains("1분 0초 역행"));
    }

    #[test]
    fn test_regression_does_not_move_baseline() {
        let config = anomaly();
        let first = row("2025-12-11 10:00:00", 1.0, "false");
        let regressed = row("2025-12-11 09:00:00", 1.0, "false");

        let state = scan_row(ScanState::default(), &first, 0, 3, &config);
        let baseline = state.previous_time;
        let state = scan_row(state, &regressed, 1, 3, &config);
        assert_eq!(state.previous_time, baseline);

        // 10:06 is measured from 10:00, not from the regressed 09:00.
        let later = row("2025-12-11 10:06:00", 1.0, "false");
        let state = scan_row(state, &later, 2, 3, &config);
        let gap = state
            .events
            .iter()
            .find(|e| e.kind == EventKind::CollectionGap)
            .expect("gap from the non-regressed baseline");
        assert!(gap.line.contains("6분 0초"));
    }

    #[test]
    fn test_simple_mode_ignores_time_anomalies() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11 09:00:00", 1.0, "false"),
            row("2025-12-11 12:00:00", 1.0, "false"),
        ];
        let outcome = scan(&rows, &simple());
        assert_eq!(kinds(&outcome), vec![EventKind::Start]);
    }

    // -------------------------------------------------------------------------
    // Timestamp gate
    // -------------------------------------------------------------------------

    #[test]
    fn test_anomaly_mode_flags_and_skips_bad_timestamps() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11T10:00:05", 2.0, "false"),
            Row {
                drive: CellValue::Number(2.0),
                ..Row::default()
            },
            row("2025-12-11 10:00:10", 1.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(outcome.skipped_rows, 2);
        assert_eq!(
            kinds(&outcome),
            vec![
                EventKind::Start,
                EventKind::FormatError,
                EventKind::FormatError,
                EventKind::End
            ]
        );
        assert!(outcome.events[1].line.contains("2번째 행"));
    }

    #[test]
    fn test_missing_drive_column_emits_no_transitions() {
        let rows: Vec<Row> = ["10:00:00", "10:00:05", "10:00:10"]
            .iter()
            .map(|t| Row {
                timestamp: CellValue::Text(format!("2025-12-11 {t}")),
                charge: CellValue::Text("false".into()),
                ..Row::default()
            })
            .collect();
        let outcome = scan(&rows, &simple());
        assert_eq!(kinds(&outcome), vec![EventKind::Start]);
        assert!(outcome.events[0].line.contains("초기상태: unknown(NaN), 미충전"));
    }

    #[test]
    fn test_format_error_quotes_raw_cell_text() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("2025-12-11T10:00:05", 1.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(
            outcome.events[1].line,
            "[2025-12-11T10:00:05] !! 시간 형식 오류: '2025-12-11T10:00:05' (2번째 행 건너뜀)"
        );
    }

    #[test]
    fn test_simple_mode_drops_rows_without_timestamp() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            Row {
                drive: CellValue::Number(2.0),
                ..Row::default()
            },
            row("2025-12-11 10:00:10", 1.0, "false"),
        ];
        let outcome = scan(&rows, &simple());
        assert_eq!(outcome.skipped_rows, 0);
        assert_eq!(kinds(&outcome), vec![EventKind::Start]);
    }

    #[test]
    fn test_simple_mode_keeps_unparseable_timestamp_text() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("sometime", 2.0, "false"),
        ];
        let outcome = scan(&rows, &simple());
        assert!(outcome.events[1].line.starts_with("[sometime] 주행 상태 변경"));
    }

    #[test]
    fn test_first_row_rejected_means_no_start_marker() {
        let rows = vec![
            row("bad", 1.0, "false"),
            row("2025-12-11 10:00:00", 1.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(kinds(&outcome), vec![EventKind::FormatError, EventKind::End]);
    }

    // -------------------------------------------------------------------------
    // Markers, idempotence, progress
    // -------------------------------------------------------------------------

    #[test]
    fn test_single_row_emits_start_and_end_only() {
        let rows = vec![row("2025-12-11 10:00:00", 1.0, "true")];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(kinds(&outcome), vec![EventKind::Start, EventKind::End]);
        assert!(outcome.events[1].line.contains("최종상태: 주행중(Run), 충전중"));
    }

    #[test]
    fn test_serial_and_text_rows_mix() {
        // 45000.5 = 2023-03-15 12:00:00
        let rows = vec![
            Row {
                timestamp: CellValue::Number(45_000.5),
                drive: CellValue::Number(0.0),
                charge: CellValue::Bool(false),
                ..Row::default()
            },
            row("2023-03-15 12:10:00", 0.0, "false"),
        ];
        let outcome = scan(&rows, &anomaly());
        assert_eq!(
            kinds(&outcome),
            vec![EventKind::Start, EventKind::CollectionGap, EventKind::End]
        );
        assert!(outcome.events[0].line.starts_with("[2023-03-15 12:00:00]"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let rows = vec![
            row("2025-12-11 10:00:00", 1.0, "false"),
            row("bad", 1.0, "false"),
            row("2025-12-11 09:00:00", 2.0, "false"),
            row("2025-12-11 10:30:00", 2.0, "true"),
        ];
        let config = anomaly();
        assert_eq!(scan(&rows, &config), scan(&rows, &config));
    }

    #[test]
    fn test_progress_does_not_change_result() {
        let rows: Vec<Row> = (0..25)
            .map(|i| row(&format!("2025-12-11 10:00:{i:02}"), (i % 3) as f64, "false"))
            .collect();
        let config = anomaly();

        let mut reports = Vec::new();
        let with_progress = build_timeline(&rows, &config, |p| reports.push(p));
        assert_eq!(with_progress, scan(&rows, &config));

        // 10% of 25 rounds down to 2 rows per step, plus the final row.
        assert_eq!(reports.len(), 13);
        assert_eq!(reports.last().map(|p| p.rows_processed), Some(25));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Simple".parse::<TimelineMode>(), Ok(TimelineMode::Simple));
        assert_eq!("anomaly".parse::<TimelineMode>(), Ok(TimelineMode::AnomalyAware));
        assert!("fast".parse::<TimelineMode>().is_err());
    }
}
