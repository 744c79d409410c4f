// RoboTrace - platform/diag_log.rs
//
// Append-only diagnostic log recording each invocation's request and
// completion summary. Best-effort by contract: open or write failures are
// traced at debug level and otherwise ignored, so the log can never abort
// or alter an analysis.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle to the diagnostic log file. Cheap to clone; the file is opened
/// per write so concurrent invocations never share a writer.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    path: Option<PathBuf>,
}

impl DiagnosticLog {
    /// Log that appends to `path`, creating parent directories on demand.
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Log that discards everything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append `[<local time>] <message>` as one line.
    pub fn record(&self, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_line(path, message) {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "Diagnostic log write failed (ignored)"
            );
        }
    }
}

fn append_line(path: &Path, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{stamp}] {message}")
}
