//! Error handling for codebook extraction and record decoding.
//!
//! Only the position table and file access can fail hard. Irregularities in
//! the codebook text are reported as [`crate::codebook::Diagnostic`] values
//! instead, since the source document is known to be inconsistent.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Malformed position table {path}: {reason}")]
    MalformedTable { path: PathBuf, reason: String },

    #[error("Failed to read record {line} in {path}: {reason}")]
    RecordRead {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DecoderError {
    /// Create a malformed table error
    pub fn malformed_table(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecoderError>;
