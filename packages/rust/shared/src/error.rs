//! Error types for eo-tracker.
//!
//! Library crates use [`EoTrackerError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all eo-tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum EoTrackerError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport/HTTP failure on the metadata query or a pagination follow-up.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Transport/HTTP failure fetching one order's full-text document.
    #[error("document fetch error for {document_id}: {message}")]
    DocumentFetch {
        document_id: String,
        message: String,
    },

    /// The full-text document is not well-formed XML.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A record field is missing or malformed.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Metadata log or watermark store error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EoTrackerError>;

impl EoTrackerError {
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

    /// Create a document fetch error for a single order.
    pub fn document_fetch(document_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::DocumentFetch {
            document_id: document_id.into(),
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

    /// Whether this error aborts the run when raised outside per-order work.
    ///
    /// Document fetch, parse, and validation errors describe one upstream
    /// record. Inside the per-order conversion loop every error is skipped
    /// and logged, whatever this returns.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::DocumentFetch { .. } | Self::Parse { .. } | Self::Validation { .. }
        )
    }
}
