// src/error.rs

//! Error types for the deployment engine
//!
//! Only conditions that must abort an operation live here. Everything
//! the engine can work around — unreadable candidate paths, unresolved
//! sonames, clean patterns matching nothing — is surfaced through the
//! [`Reporter`](crate::reporter::Reporter) instead of an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a deploy or clean operation
#[derive(Error, Debug)]
pub enum Error {
    /// ELF signature matched but the structure did not parse
    #[error("Malformed binary '{path}': {reason}")]
    MalformedBinary { path: PathBuf, reason: String },

    /// Caller supplied an invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Write-side failure while placing a path in the bundle
    #[error("Failed to deploy '{path}': {source}")]
    Deploy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removal failure other than the target already being absent
    #[error("Failed to remove '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand constructor for [`Error::MalformedBinary`]
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedBinary {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
