// RoboTrace - core/report.rs
//
// Report assembly: caps the event list and renders the final summary text.
// Core layer: writes nothing, returns owned strings.

use crate::core::model::TimelineEvent;
use crate::core::timeline::{ScanOutcome, TimelineConfig};
use crate::util::constants;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Cap `lines` at `max` entries.
///
/// When the cap is exceeded the list is cut to exactly `max` lines and a
/// single omission marker is appended as the last line; the marker itself
/// is not counted against the cap.
pub fn cap_events(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if lines.len() > max {
        lines.truncate(max);
        lines.push(constants::OMITTED_MARKER.to_string());
    }
    lines
}

/// Assembled analysis result for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Base name of the input file (no directory).
    pub file_name: String,
    pub total_rows: usize,
    /// Present only when the scan counts skipped rows (anomaly-aware mode).
    pub skipped_rows: Option<usize>,
    /// Capped event lines, omission marker included.
    pub lines: Vec<String>,
}

impl Report {
    /// Build the report from a finished scan.
    pub fn assemble(file_path: &Path, outcome: ScanOutcome, config: &TimelineConfig) -> Self {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.display().to_string());

        let lines = outcome
            .events
            .into_iter()
            .map(|TimelineEvent { line, .. }| line)
            .collect();

        Self {
            file_name,
            total_rows: outcome.total_rows,
            skipped_rows: config.strict_timestamps.then_some(outcome.skipped_rows),
            lines: cap_events(lines, config.max_events),
        }
    }

    /// Number of lines in the (capped) timeline, omission marker included.
    pub fn event_count(&self) -> usize {
        self.lines.len()
    }

    /// Render the summary text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("[로봇 데이터 분석 결과]\n");
        out.push_str(&format!("파일명: {}\n", self.file_name));
        out.push_str(&format!("총 데이터: {}행\n", self.total_rows));
        if let Some(skipped) = self.skipped_rows {
            out.push_str(&format!("건너뛴 행: {skipped}행\n"));
        }
        out.push_str(&format!("감지된 이벤트: {}건\n", self.event_count()));
        out.push('\n');
        out.push_str("--- 타임라인 (Timeline) ---\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("--- 끝 ---\n");
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
