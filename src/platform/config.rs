// RoboTrace - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and
// config.toml loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::timeline::{TimelineConfig, TimelineMode};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for RoboTrace configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/robotrace/ or %APPDATA%\RoboTrace\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the diagnostic log.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    /// Default location of the diagnostic log.
    pub fn diagnostic_log(&self) -> PathBuf {
        self.data_dir.join(constants::DIAGNOSTIC_LOG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[timeline]` section.
    pub timeline: TimelineSection,
    /// `[diagnostics]` section.
    pub diagnostics: DiagnosticsSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[timeline]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    /// "simple" or "anomaly".
    pub mode: Option<String>,
    /// Elapsed seconds that count as a collection gap.
    pub gap_threshold_seconds: Option<i64>,
    /// Event-list cap.
    pub max_events: Option<usize>,
    /// Service-tag length that triggers truncation.
    pub service_max_len: Option<usize>,
    /// Characters kept from a truncated service tag.
    pub service_keep_len: Option<usize>,
}

/// `[diagnostics]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiagnosticsSection {
    /// Whether the request/completion log is written at all.
    pub enabled: Option<bool>,
    /// Log file path (empty = platform data directory).
    pub log_file: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Timeline toggles and limits.
    pub timeline: TimelineConfig,

    /// Whether the diagnostic log is written.
    pub diagnostics_enabled: bool,
    /// Explicit diagnostic log path (None = platform data directory).
    pub diagnostics_file: Option<PathBuf>,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            diagnostics_enabled: true,
            diagnostics_file: None,
            log_level: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config file found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match read_raw_config(config_path) {
        Ok(raw) => {
            tracing::info!(path = %config_path.display(), "Loaded config file");
            let (config, warnings) = validate(raw);
            if !warnings.is_empty() {
                tracing::warn!(
                    count = warnings.len(),
                    "Config validation produced warnings"
                );
            }
            (config, warnings)
        }
        Err(e) => {
            let msg = format!(
                "{e}. Using defaults. See config.example.toml for the expected format."
            );
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Timeline: mode (decides the per-mode defaults below) --
    if let Some(ref mode) = raw.timeline.mode {
        match mode.parse::<TimelineMode>() {
            Ok(mode) => config.timeline = TimelineConfig::for_mode(mode),
            Err(e) => warnings.push(format!(
                "[timeline] mode: {e}. Using default ({}).",
                TimelineMode::default()
            )),
        }
    }

    // -- Timeline: gap_threshold_seconds --
    if let Some(secs) = raw.timeline.gap_threshold_seconds {
        if (constants::MIN_GAP_THRESHOLD_SECS..=constants::MAX_GAP_THRESHOLD_SECS).contains(&secs)
        {
            config.timeline.gap_threshold_ms = secs * 1_000;
        } else {
            warnings.push(out_of_range(
                "timeline.gap_threshold_seconds",
                secs,
                constants::MIN_GAP_THRESHOLD_SECS,
                constants::MAX_GAP_THRESHOLD_SECS,
                constants::DEFAULT_GAP_THRESHOLD_SECS,
            ));
        }
    }

    // -- Timeline: max_events --
    if let Some(max) = raw.timeline.max_events {
        if (1..=constants::ABSOLUTE_MAX_EVENTS).contains(&max) {
            config.timeline.max_events = max;
        } else {
            warnings.push(out_of_range(
                "timeline.max_events",
                max,
                1,
                constants::ABSOLUTE_MAX_EVENTS,
                config.timeline.max_events,
            ));
        }
    }

    // -- Timeline: service truncation (validated as a pair) --
    let max_len = raw
        .timeline
        .service_max_len
        .unwrap_or(config.timeline.service_max_len);
    let keep_len = raw
        .timeline
        .service_keep_len
        .unwrap_or(config.timeline.service_keep_len);
    if raw.timeline.service_max_len.is_some() || raw.timeline.service_keep_len.is_some() {
        if (1..=constants::ABSOLUTE_MAX_SERVICE_LEN).contains(&max_len) && keep_len < max_len {
            config.timeline.service_max_len = max_len;
            config.timeline.service_keep_len = keep_len;
        } else {
            warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "timeline.service_max_len/service_keep_len".to_string(),
                    value: format!("{max_len}/{keep_len}"),
                    expected: format!(
                        "1 <= max <= {} and keep < max. Using defaults ({}/{})",
                        constants::ABSOLUTE_MAX_SERVICE_LEN,
                        config.timeline.service_max_len,
                        config.timeline.service_keep_len,
                    ),
                }
                .to_string(),
            );
        }
    }

    // -- Diagnostics --
    if let Some(enabled) = raw.diagnostics.enabled {
        config.diagnostics_enabled = enabled;
    }
    if let Some(ref file) = raw.diagnostics.log_file {
        if !file.is_empty() {
            config.diagnostics_file = Some(PathBuf::from(file));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

fn out_of_range<T: std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
    default: T,
) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}. Using default ({default})"),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        let raw: RawConfig = toml::from_str(toml_text).unwrap();
        validate(raw)
    }

    #[test]
    fn test_empty_config_gives_anomaly_defaults() {
        let (config, warnings) = parse("");
        assert!(warnings.is_empty());
        assert_eq!(config.timeline, TimelineConfig::for_mode(TimelineMode::AnomalyAware));
        assert!(config.diagnostics_enabled);
    }

    #[test]
    fn test_simple_mode_brings_simple_limits() {
        let (config, warnings) = parse("[timeline]\nmode = \"simple\"\n");
        assert!(warnings.is_empty());
        assert_eq!(config.timeline.max_events, constants::SIMPLE_MAX_EVENTS);
        assert_eq!(config.timeline.service_max_len, 200);
        assert_eq!(config.timeline.service_keep_len, 197);
    }

    #[test]
    fn test_overrides_apply_on_top_of_mode() {
        let (config, warnings) = parse(
            "[timeline]\nmode = \"simple\"\ngap_threshold_seconds = 60\nmax_events = 50\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.timeline.mode, TimelineMode::Simple);
        assert_eq!(config.timeline.gap_threshold_ms, 60_000);
        assert_eq!(config.timeline.max_events, 50);
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            "[timeline]\nmode = \"turbo\"\ngap_threshold_seconds = 0\nmax_events = 0\n\
             service_max_len = 10\nservice_keep_len = 10\n\n[logging]\nlevel = \"loud\"\n",
        );
        assert_eq!(warnings.len(), 5, "{warnings:?}");
        assert_eq!(config.timeline, TimelineConfig::default());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_diagnostics_section() {
        let (config, _) = parse("[diagnostics]\nenabled = false\nlog_file = \"/tmp/rt.log\"\n");
        assert!(!config.diagnostics_enabled);
        assert_eq!(config.diagnostics_file, Some(PathBuf::from("/tmp/rt.log")));
    }

    #[test]
    fn test_missing_file_is_silent_default() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert!(config.diagnostics_enabled);
    }

    #[test]
    fn test_broken_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeline\nmode = ").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
        assert_eq!(config.timeline, TimelineConfig::default());
    }
}
