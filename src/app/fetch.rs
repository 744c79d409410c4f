// RoboTrace - app/fetch.rs
//
// Invocation boundary. One call analyses one file and always produces a
// `ToolResult`; failures are folded into the result text instead of being
// propagated, so callers never see a partial timeline.
//
// Sequence:
//   1. Record the request in the diagnostic log.
//   2. Validate the input path.
//   3. Read rows; an empty sheet is a normal (non-error) answer.
//   4. Scan, cap and render the report.
//   5. Record the completion count.

use crate::core::report::Report;
use crate::core::timeline::{self, TimelineConfig};
use crate::platform::config::AppConfig;
use crate::platform::diag_log::DiagnosticLog;
use crate::platform::sheet;
use crate::util::constants;
use crate::util::error::{InputError, Result, RoboTraceError};
use serde::Serialize;
use std::path::Path;

/// Text answer plus error flag, serialised as `{ "text": .., "isError": .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub text: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Outcome of a successful analysis.
#[derive(Debug)]
enum Analysis {
    Empty,
    Report(Report),
}

/// Analyse `file_path` and return the rendered timeline report.
pub fn fetch_robot_events(
    file_path: &Path,
    config: &AppConfig,
    diag: &DiagnosticLog,
) -> ToolResult {
    diag.record(&format!(">>> [요청 수신] {}", request_json(file_path)));
    tracing::info!(
        file = %file_path.display(),
        mode = %config.timeline.mode,
        "Analysis requested"
    );

    match analyse(file_path, &config.timeline) {
        Ok(Analysis::Report(report)) => {
            let count = report.event_count();
            diag.record(&format!(">>> [완료] {count}건 반환"));
            tracing::info!(
                file = %report.file_name,
                rows = report.total_rows,
                events = count,
                "Analysis complete"
            );
            ToolResult::ok(report.render())
        }
        Ok(Analysis::Empty) => {
            tracing::info!(file = %file_path.display(), "No data rows");
            ToolResult::ok(constants::MSG_EMPTY_DATA)
        }
        Err(RoboTraceError::Input(InputError::MissingPath | InputError::NotFound { .. })) => {
            tracing::warn!(file = %file_path.display(), "Input file not found");
            ToolResult::error(constants::MSG_FILE_NOT_FOUND)
        }
        Err(e) => {
            tracing::error!(file = %file_path.display(), error = %e, "Analysis failed");
            diag.record(&format!("!!! 에러: {e}"));
            ToolResult::error(format!("{}: {e}", constants::MSG_ERROR_PREFIX))
        }
    }
}

fn analyse(file_path: &Path, config: &TimelineConfig) -> Result<Analysis> {
    check_input(file_path)?;

    let rows = sheet::read_rows(file_path)?;
    if rows.is_empty() {
        return Ok(Analysis::Empty);
    }

    let outcome = timeline::build_timeline(&rows, config, |progress| {
        tracing::debug!(
            processed = progress.rows_processed,
            total = progress.total_rows,
            percent = progress.percent(),
            "Scan progress"
        );
    });

    Ok(Analysis::Report(Report::assemble(file_path, outcome, config)))
}

fn check_input(file_path: &Path) -> std::result::Result<(), InputError> {
    if file_path.as_os_str().is_empty() {
        return Err(InputError::MissingPath);
    }
    if !file_path.exists() {
        return Err(InputError::NotFound {
            path: file_path.to_path_buf(),
        });
    }
    if !file_path.is_file() {
        return Err(InputError::NotAFile {
            path: file_path.to_path_buf(),
        });
    }
    Ok(())
}

fn request_json(file_path: &Path) -> String {
    serde_json::json!({ "file_path": file_path.to_string_lossy() }).to_string()
}
