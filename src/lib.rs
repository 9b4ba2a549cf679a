//! BRFSS Decoder Library
//!
//! Turns the plain-text rendering of a BRFSS survey codebook into a field
//! dictionary and uses it to decode fixed-width survey response records.
//!
//! This library provides tools for:
//! - Loading field positions from the tab-delimited variable layout table
//! - Parsing value/label listings, descriptions and column locations out of
//!   the codebook text, with non-fatal diagnostics for irregular lines
//! - Decoding fixed-width records into labeled values and writing CSV
//!
//! ```
//! use brfss_decoder::codebook::parse_lines;
//! use brfss_decoder::constants::DEFAULT_PAGE_HEADER;
//!
//! let text = [
//!     "Column: 112 SAS Variable Name: HADMAM",
//!     "Value Value Label Frequency Percentage Weighted",
//!     "1 Yes 120 12.34 11.98",
//! ];
//! let outcome = parse_lines(text, DEFAULT_PAGE_HEADER);
//! let hadmam = outcome.fields.get("HADMAM").unwrap();
//! assert_eq!(hadmam.label("01"), Some("Yes"));
//! ```

pub mod cli;
pub mod codebook;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod models;
pub mod positions;
pub mod processor;

pub use codebook::{Diagnostic, ParseOutcome, parse_codebook_file, parse_lines};
pub use config::DecoderConfig;
pub use error::{DecoderError, Result};
pub use models::{FieldDictionary, FieldSpec, ProcessingStats};
