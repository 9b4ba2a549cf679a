//! Configuration management and validation.
//!
//! Holds the settings shared by the codebook parser and the record decoder:
//! which fields to decode, the running page header that marks page breaks in
//! the codebook text, and the position table delimiter.

use crate::constants::{DEFAULT_FIELDS_OF_INTEREST, DEFAULT_PAGE_HEADER, DEFAULT_TABLE_SEPARATOR};
use crate::error::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Global configuration for a decoding run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Fields written to the output, in column order
    pub fields_of_interest: Vec<String>,

    /// Running header text printed at the top of each codebook page
    pub page_header: String,

    /// Delimiter of the position table
    pub table_separator: u8,

    /// Show progress bars while decoding records
    pub show_progress: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            fields_of_interest: DEFAULT_FIELDS_OF_INTEREST
                .iter()
                .map(|field| field.to_string())
                .collect(),
            page_header: DEFAULT_PAGE_HEADER.to_string(),
            table_separator: DEFAULT_TABLE_SEPARATOR,
            show_progress: true,
        }
    }
}

impl DecoderConfig {
    /// Replace the fields of interest, dropping repeats but keeping order
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        self.fields_of_interest = fields
            .into_iter()
            .map(Into::into)
            .filter(|field: &String| seen.insert(field.clone()))
            .collect();
        self
    }

    /// Set the running page header text
    pub fn with_page_header(mut self, page_header: impl Into<String>) -> Self {
        self.page_header = page_header.into();
        self
    }

    /// Set the position table delimiter
    pub fn with_table_separator(mut self, separator: u8) -> Self {
        self.table_separator = separator;
        self
    }

    /// Disable progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.fields_of_interest.is_empty() {
            return Err(DecoderError::configuration(
                "at least one field of interest is required",
            ));
        }
        if self.fields_of_interest.iter().any(|f| f.trim().is_empty()) {
            return Err(DecoderError::configuration("field names cannot be empty"));
        }
        if self.page_header.trim().is_empty() {
            return Err(DecoderError::configuration("page header cannot be empty"));
        }

        debug!(
            "Configuration valid: {} fields of interest, separator {:?}",
            self.fields_of_interest.len(),
            self.table_separator as char
        );
        Ok(())
    }
}
