// RoboTrace - util/constants.rs
//
// Single source of truth for named constants, limits, column names,
// and user-visible fixed strings.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "RoboTrace";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "RoboTrace";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input column contract
//
// Header names are a fixed data contract with the robot telemetry export.
// They are matched exactly (no trimming of case, no schema inference).
// =============================================================================

/// Collection timestamp column.
pub const COL_TIME: &str = "수집일시";

/// Drive status code column.
pub const COL_DRIVE: &str = "주행상태";

/// Charge status flag column.
pub const COL_CHARGE: &str = "충전상태";

/// X coordinate column.
pub const COL_X: &str = "x좌표";

/// Y coordinate column.
pub const COL_Y: &str = "y좌표";

/// Free-text service tag column.
pub const COL_SERVICE: &str = "service";

/// Service mode column (only annotated in anomaly-aware mode).
pub const COL_SERVICE_MODE: &str = "service_mode";

// =============================================================================
// Timestamp handling
// =============================================================================

/// Days between the spreadsheet serial-date epoch (1899-12-30) and the Unix epoch.
pub const SERIAL_DATE_UNIX_OFFSET_DAYS: f64 = 25_569.0;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400.0 * 1_000.0;

/// Display format for parsed timestamps in event lines.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Timeline limits
// =============================================================================

/// Default gap between consecutive samples that counts as a collection gap.
pub const DEFAULT_GAP_THRESHOLD_SECS: i64 = 300;

/// Minimum configurable gap threshold (seconds).
pub const MIN_GAP_THRESHOLD_SECS: i64 = 1;

/// Maximum configurable gap threshold (seconds). One day.
pub const MAX_GAP_THRESHOLD_SECS: i64 = 86_400;

/// Event cap for the simple timeline mode.
pub const SIMPLE_MAX_EVENTS: usize = 5_000;

/// Event cap for the anomaly-aware timeline mode.
pub const ANOMALY_MAX_EVENTS: usize = 10_000;

/// Hard upper bound on the configurable event cap.
pub const ABSOLUTE_MAX_EVENTS: usize = 1_000_000;

/// Service-tag truncation limits for the simple mode (max, keep).
pub const SIMPLE_SERVICE_MAX_LEN: usize = 200;
pub const SIMPLE_SERVICE_KEEP_LEN: usize = 197;

/// Service-tag truncation limits for the anomaly-aware mode (max, keep).
pub const ANOMALY_SERVICE_MAX_LEN: usize = 1_000;
pub const ANOMALY_SERVICE_KEEP_LEN: usize = 997;

/// Hard upper bound on the configurable service-tag length.
pub const ABSOLUTE_MAX_SERVICE_LEN: usize = 100_000;

/// Marker appended to a truncated service tag.
pub const ELLIPSIS: &str = "...";

/// Placeholder text for absent annotation values.
pub const PLACEHOLDER: &str = "-";

/// Progress is reported each time this percentage of rows has been scanned.
pub const PROGRESS_STEP_PERCENT: usize = 10;

// =============================================================================
// Report text
// =============================================================================

/// Final line appended when the event list was capped.
pub const OMITTED_MARKER: &str = "... (이후 데이터 생략됨)";

/// Result text when the input path does not exist.
pub const MSG_FILE_NOT_FOUND: &str = "에러: 파일이 존재하지 않습니다.";

/// Result text when the workbook parsed to zero rows.
pub const MSG_EMPTY_DATA: &str = "데이터가 비어 있습니다.";

/// Prefix of the result text for unexpected failures.
pub const MSG_ERROR_PREFIX: &str = "오류 발생";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Diagnostic (request/completion) log file name in the data directory.
pub const DIAGNOSTIC_LOG_FILE_NAME: &str = "robotrace.log";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
