// RoboTrace - util/logging.rs
//
// tracing-subscriber setup for the CLI.
//
// Stdout carries exactly one thing: the report text, or the `--json`
// ToolResult. Callers pipe or parse it, so every log line goes to stderr
// and the two streams never interleave.
//
// Level selection, first match wins:
//   RUST_LOG (full EnvFilter syntax) > --debug > [logging] level > "info"

use tracing_subscriber::EnvFilter;

/// Filter directive for the given sources, or `None` when RUST_LOG is set
/// and should be parsed by `EnvFilter` itself.
fn directive(rust_log_set: bool, debug_flag: bool, config_level: Option<&str>) -> Option<String> {
    if rust_log_set {
        None
    } else if debug_flag {
        Some("debug".to_string())
    } else {
        Some(
            config_level
                .unwrap_or(super::constants::DEFAULT_LOG_LEVEL)
                .to_lowercase(),
        )
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let filter = match directive(rust_log_set, debug_flag, config_level) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::from_default_env(),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Logging initialised"
        );
    }
}
