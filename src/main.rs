// RoboTrace - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (before logging, so [logging] level can apply)
// 3. Logging initialisation (debug mode support)
// 4. One analysis, printed to stdout as text or JSON

use clap::Parser;
use robotrace::app::fetch;
use robotrace::core::timeline::{TimelineConfig, TimelineMode};
use robotrace::platform::config::{self, PlatformPaths};
use robotrace::platform::diag_log::DiagnosticLog;
use robotrace::util;
use std::path::PathBuf;

/// RoboTrace - robot telemetry timeline extractor.
///
/// Reads a robot telemetry workbook (or CSV export) and prints the moments
/// where the drive or charge state changed, plus timestamp anomalies.
#[derive(Parser, Debug)]
#[command(name = "robotrace", version, about)]
struct Cli {
    /// Workbook or CSV file to analyse.
    path: PathBuf,

    /// Scan mode: "simple" or "anomaly" (overrides config.toml).
    #[arg(short = 'm', long = "mode")]
    mode: Option<TimelineMode>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Print the result as `{"text": .., "isError": ..}` JSON.
    #[arg(long = "json")]
    json: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Do not write the diagnostic log.
    #[arg(long = "no-diagnostics")]
    no_diagnostics: bool,
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (mut app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "RoboTrace starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // A CLI mode switch brings that mode's defaults; the gap threshold is
    // mode-independent and stays as configured.
    if let Some(mode) = cli.mode {
        if mode != app_config.timeline.mode {
            let gap_threshold_ms = app_config.timeline.gap_threshold_ms;
            app_config.timeline = TimelineConfig {
                gap_threshold_ms,
                ..TimelineConfig::for_mode(mode)
            };
        }
    }

    let diag = if app_config.diagnostics_enabled && !cli.no_diagnostics {
        DiagnosticLog::new(
            app_config
                .diagnostics_file
                .clone()
                .unwrap_or_else(|| platform_paths.diagnostic_log()),
        )
    } else {
        DiagnosticLog::disabled()
    };

    let result = fetch::fetch_robot_events(&cli.path, &app_config, &diag);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise result");
                eprintln!("Error: failed to serialise result: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", result.text);
        if !result.text.ends_with('\n') {
            println!();
        }
    }

    if result.is_error {
        std::process::exit(1);
    }
}
