//! Error types for demoindex.
//!
//! Library crates use [`DemoIndexError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Recoverable pipeline findings (missing READMEs, broken links, incomplete
//! exports) are not errors in this sense: they are collected into a
//! [`ValidationReport`](crate::ValidationReport) and returned to the caller.

use std::path::PathBuf;

/// Top-level error type for all demoindex operations.
#[derive(Debug, thiserror::Error)]
pub enum DemoIndexError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed input (config file, glob pattern, etc.).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Directory traversal failed.
    #[error("walk error at {path:?}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Data validation error (unexpected layout, invalid state, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DemoIndexError>;

impl DemoIndexError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a traversal error for the given path.
    pub fn walk(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Walk {
            path: path.into(),
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DemoIndexError::config("build_config.json not found");
        assert_eq!(err.to_string(), "config error: build_config.json not found");

        let err = DemoIndexError::validation("staging directory is a file");
        assert!(err.to_string().contains("staging directory"));
    }

    #[test]
    fn io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DemoIndexError::io("/tmp/missing", source);
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing"));
        assert!(msg.contains("gone"));
    }
}
