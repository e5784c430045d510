//! Typed error handling for usagegraph.
//!
//! Graph, ledger and analysis operations never fail: evidence gaps degrade
//! to heuristics. Errors only come from the edges of the system: reading
//! evidence and markup files, loading configuration and writing reports.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for usagegraph operations.
#[derive(Error, Debug)]
pub enum UsageGraphError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed evidence record
    #[error("Evidence error in {path} line {line}: {message}")]
    Evidence {
        path: PathBuf,
        /// Line number (1-indexed)
        line: usize,
        message: String,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Report serialization errors
    #[error("Report error: {message}")]
    Report { message: String },
}

impl UsageGraphError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an evidence error at a line.
    pub fn evidence(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Evidence {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error.
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Evidence { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for UsageGraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::report(err.to_string())
    }
}

/// Convenience type alias for usagegraph results.
pub type UsageGraphResult<T> = Result<T, UsageGraphError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> UsageGraphResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> UsageGraphResult<T> {
        self.map_err(|e| UsageGraphError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let err = UsageGraphError::io(
            PathBuf::from("/evidence/app.jsonl"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, UsageGraphError::Io { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("/evidence/app.jsonl")));
        assert!(err.to_string().contains("/evidence/app.jsonl"));
    }

    #[test]
    fn test_evidence_error_with_line() {
        let err = UsageGraphError::evidence("/evidence/app.jsonl", 7, "missing field `kind`");
        if let UsageGraphError::Evidence { line, .. } = &err {
            assert_eq!(*line, 7);
        } else {
            panic!("Expected Evidence error");
        }
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_config_error_path() {
        let err = UsageGraphError::config("/p/usagegraph.toml", "expected `]`");
        assert_eq!(err.path(), Some(&PathBuf::from("/p/usagegraph.toml")));
        assert!(err.to_string().starts_with("Config error"));
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let mapped = result.with_path("/missing/file.jsonl");
        assert!(matches!(mapped, Err(UsageGraphError::Io { .. })));
    }
}
