//! Error model for the detection, matching, and trend pipelines
//!
//! Every stage is fail-fast: a missing threshold, an unresolvable identifier,
//! or a malformed table aborts the run for that table with a message naming
//! the offending id, location, or file. An empty comparison table is not an
//! error; the matcher returns an empty, correctly-shaped result instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the catex library
#[derive(Error, Debug)]
pub enum CatexError {
    /// A threshold bound, zone range, or history identifier is absent
    #[error("Missing reference data: {0}")]
    MissingReferenceData(String),

    /// An identifier resolved to zero or several rows where exactly one was required
    #[error("Ambiguous match for {id}: expected exactly one row, found {found}")]
    AmbiguousMatch { id: String, found: usize },

    /// A table lacks expected columns, or a date/identifier cannot be parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for catex operations
pub type Result<T> = std::result::Result<T, CatexError>;

impl CatexError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CatexError::MalformedInput(message.into())
    }

    pub(crate) fn missing(message: impl Into<String>) -> Self {
        CatexError::MissingReferenceData(message.into())
    }
}
