// RoboTrace - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// The timeline core is infallible; every variant here originates in the
// platform layer. `RoboTraceError` is what an analysis can fail with;
// `ConfigError` never aborts anything and is rendered into startup warnings.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for one analysis request.
/// Errors are categorised by the stage that produced them.
#[derive(Debug)]
pub enum RoboTraceError {
    /// The input file is missing or unusable.
    Input(InputError),

    /// Workbook or CSV reading failed.
    Sheet(SheetError),
}

impl fmt::Display for RoboTraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Sheet(e) => write!(f, "Sheet error: {e}"),
        }
    }
}

impl std::error::Error for RoboTraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(e) => Some(e),
            Self::Sheet(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors about the input path itself, raised before any reading happens.
#[derive(Debug)]
pub enum InputError {
    /// No path was supplied.
    MissingPath,

    /// The path does not exist.
    NotFound { path: PathBuf },

    /// The path exists but is a directory.
    NotAFile { path: PathBuf },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPath => write!(f, "No input file path was given"),
            Self::NotFound { path } => {
                write!(f, "Input file '{}' does not exist", path.display())
            }
            Self::NotAFile { path } => {
                write!(f, "Input path '{}' is not a file", path.display())
            }
        }
    }
}

impl std::error::Error for InputError {}

impl From<InputError> for RoboTraceError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Sheet errors
// ---------------------------------------------------------------------------

/// Errors raised while turning a workbook or CSV file into rows.
#[derive(Debug)]
pub enum SheetError {
    /// The file extension is not a supported tabular format.
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The spreadsheet container could not be opened or decoded.
    Workbook {
        path: PathBuf,
        source: calamine::Error,
    },

    /// The workbook contains no worksheets.
    NoWorksheet { path: PathBuf },

    /// CSV decoding failed, including I/O errors while reading.
    Csv { path: PathBuf, source: csv::Error },
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { path, extension } => write!(
                f,
                "'{}': unsupported file type '{extension}' \
                 (expected xlsx, xlsm, xlsb, xls, ods or csv)",
                path.display()
            ),
            Self::Workbook { path, source } => {
                write!(f, "'{}': cannot read workbook: {source}", path.display())
            }
            Self::NoWorksheet { path } => {
                write!(f, "'{}': workbook has no worksheets", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "'{}': CSV error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Workbook { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SheetError> for RoboTraceError {
    fn from(e: SheetError) -> Self {
        Self::Sheet(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading. Reported as warnings only.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for RoboTrace results.
pub type Result<T> = std::result::Result<T, RoboTraceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_input_error_display_names_path() {
        let err = RoboTraceError::from(InputError::NotFound {
            path: PathBuf::from("/tmp/robot.xlsx"),
        });
        let text = err.to_string();
        assert!(text.starts_with("Input error:"));
        assert!(text.contains("/tmp/robot.xlsx"));
    }

    #[test]
    fn test_workbook_error_preserves_source() {
        let err = RoboTraceError::from(SheetError::Workbook {
            path: PathBuf::from("robot.xlsx"),
            source: calamine::Error::Msg("bad zip"),
        });
        let sheet = err.source().expect("top-level error should chain to SheetError");
        let cause = sheet.source().expect("SheetError::Workbook should chain to calamine");
        assert_eq!(cause.to_string(), "bad zip");
        assert!(err.to_string().contains("robot.xlsx"));
    }

    #[test]
    fn test_config_io_error_preserves_source() {
        let err = ConfigError::Io {
            path: PathBuf::from("config.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Config I/O error 'config.toml'"));
    }

    #[test]
    fn test_unsupported_format_lists_extensions() {
        let err = SheetError::UnsupportedFormat {
            path: PathBuf::from("robot.txt"),
            extension: "txt".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("'txt'"));
        assert!(text.contains("csv"));
    }
}
