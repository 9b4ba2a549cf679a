//! Non-fatal parse findings returned alongside the field dictionary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a finding matters to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Info,
}

/// A parse-quality record tied to a codebook line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number in the codebook text
    pub line: usize,
    /// Field in scope when the finding was made
    pub field: Option<String>,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A line appended to a multi-line description looks like a new metadata item
    DescriptionIntegrity { text: String },
    /// A value row could not be reduced to a key and a label
    UnparseableRowSkipped { row: String },
    /// A "Number of ..." range description, not an enumerable code
    SubRangeSkipped { row: String },
    /// A `Column:` line without the variable name markers
    MalformedColumnLine { text: String },
}

impl Diagnostic {
    pub fn new(line: usize, field: Option<&str>, kind: DiagnosticKind) -> Self {
        Self {
            line,
            field: field.map(String::from),
            kind,
        }
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            DiagnosticKind::DescriptionIntegrity { .. }
            | DiagnosticKind::MalformedColumnLine { .. } => Severity::Warning,
            DiagnosticKind::UnparseableRowSkipped { .. }
            | DiagnosticKind::SubRangeSkipped { .. } => Severity::Info,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(field) = &self.field {
            write!(f, " [{}]", field)?;
        }
        match &self.kind {
            DiagnosticKind::DescriptionIntegrity { text } => {
                write!(f, ": non-description text joined to description: {:?}", text)
            }
            DiagnosticKind::UnparseableRowSkipped { row } => {
                write!(f, ": skipped unparseable value row {:?}", row)
            }
            DiagnosticKind::SubRangeSkipped { row } => {
                write!(f, ": skipped numeric range row {:?}", row)
            }
            DiagnosticKind::MalformedColumnLine { text } => {
                write!(f, ": column line without variable name {:?}", text)
            }
        }
    }
}
