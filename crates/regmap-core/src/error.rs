//! Error types for regmap-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in regmap-core
///
/// Validation findings are not errors; they are returned as
/// [`ValidationIssue`](crate::ValidationIssue) values.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to open or read a source file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source is not usable as a delimited table (e.g. no header line)
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Unknown export format name
    #[error("unknown export format '{0}' (expected 'md' or 'html')")]
    UnknownFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from loading a register table
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. } | Error::CsvParse { .. } | Error::Csv { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_classification() {
        let err = Error::CsvParse {
            path: PathBuf::from("map.csv"),
            message: "no header".to_string(),
        };
        assert!(err.is_load_error());
        assert_eq!(err.to_string(), "failed to parse CSV 'map.csv': no header");

        assert!(!Error::UnknownFormat("pdf".to_string()).is_load_error());
    }
}
