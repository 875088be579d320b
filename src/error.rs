use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `HerdError` and maps to other errors to
/// convert to a `HerdError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum HerdError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A parameter failed validation. The message names the parameter.
    ConfigError(String),
    ReportError(String),
    HerdError(String),
}

impl From<io::Error> for HerdError {
    fn from(error: io::Error) -> Self {
        HerdError::IoError(error)
    }
}

impl From<serde_json::Error> for HerdError {
    fn from(error: serde_json::Error) -> Self {
        HerdError::JsonError(error)
    }
}

impl From<csv::Error> for HerdError {
    fn from(error: csv::Error) -> Self {
        HerdError::CSVError(error)
    }
}

impl From<String> for HerdError {
    fn from(error: String) -> Self {
        HerdError::HerdError(error)
    }
}

impl From<&str> for HerdError {
    fn from(error: &str) -> Self {
        HerdError::HerdError(error.to_string())
    }
}

impl std::error::Error for HerdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HerdError::IoError(error) => Some(error),
            HerdError::JsonError(error) => Some(error),
            HerdError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for HerdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HerdError::ConfigError(msg) => write!(f, "invalid configuration: {msg}"),
            HerdError::ReportError(msg) => write!(f, "report error: {msg}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
