//! Survey codebook text parsing.
//!
//! Recovers, for each survey field, its description, its character location
//! and the mapping from encoded answer values to labels, from a plain-text
//! rendering of the published codebook report.
//!
//! The report has no formal grammar. Parsing is a best-effort heuristic:
//! unrecognized lines never abort the pass, and irregularities come back as
//! [`Diagnostic`] values next to the extracted fields.

mod diagnostics;
mod rows;
mod state;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use rows::{FieldContext, completes_row, field_context, is_extraneous, is_stop_marker};
pub use state::{CodebookParser, ParseEvent, ParserMode};

use crate::constants::CODEBOOK_FORMAT_VERSION;
use crate::error::{DecoderError, Result};
use crate::models::FieldDictionary;
use std::path::Path;
use tracing::{debug, warn};

/// Fields and findings from one pass over a codebook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub fields: FieldDictionary,
    pub diagnostics: Vec<Diagnostic>,
    pub lines_read: usize,
}

impl ParseOutcome {
    /// Fold a parser event into the result
    pub fn apply(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::Value {
                field,
                keys,
                label,
                description,
                location,
            } => {
                let spec = self.fields.entry(&field);
                for key in keys {
                    spec.codebook.insert(key, label.clone());
                }
                spec.description = Some(description);
                spec.location = Some(location);
            }
            ParseEvent::Diagnostic(diagnostic) => {
                if diagnostic.is_warning() {
                    warn!("Codebook {}", diagnostic);
                } else {
                    debug!("Codebook {}", diagnostic);
                }
                self.diagnostics.push(diagnostic);
            }
        }
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

/// Parse codebook text given as a sequence of lines
pub fn parse_lines<I, S>(lines: I, page_header: &str) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = CodebookParser::new(page_header);
    let mut outcome = ParseOutcome::default();

    for line in lines {
        for event in parser.step(line.as_ref()) {
            outcome.apply(event);
        }
    }
    for event in parser.finish() {
        outcome.apply(event);
    }

    outcome.lines_read = parser.lines_read();
    debug!(
        "Parsed {} codebook lines (marker table v{}): {} fields, {} diagnostics",
        outcome.lines_read,
        CODEBOOK_FORMAT_VERSION,
        outcome.fields.len(),
        outcome.diagnostics.len()
    );
    outcome
}

/// Parse the codebook text file at `path`
pub fn parse_codebook_file(path: &Path, page_header: &str) -> Result<ParseOutcome> {
    let lines = read_codebook_lines(path)?;
    Ok(parse_lines(lines, page_header))
}

/// Read codebook lines, dropping byte sequences that are not valid UTF-8.
///
/// Text extracted from the PDF report contains stray bytes from ligatures and
/// symbols; they carry no meaning for parsing.
pub fn read_codebook_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(DecoderError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    Ok(decode_lines(&bytes))
}

fn decode_lines(bytes: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = bytes
        .split(|&b| b == b'\n')
        .map(|line| {
            String::from_utf8_lossy(line)
                .chars()
                .filter(|&c| c != char::REPLACEMENT_CHARACTER)
                .collect()
        })
        .collect();

    // a trailing newline does not start another line
    if bytes.ends_with(b"\n") {
        lines.pop();
    }
    lines
}
