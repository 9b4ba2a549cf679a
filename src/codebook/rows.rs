//! Line predicates and value-row transformations.
//!
//! Everything here is a pure function of its input text. The stateful part
//! of the parser lives in [`super::state`].

use crate::constants::{BLANK_KEY, BLANK_LABEL, TRAILING_STAT_COLUMNS, markers};

/// Field name and character location taken from a `Column:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    pub name: String,
    pub location: String,
}

/// True for lines that close a field's value listing
pub fn is_stop_marker(line: &str) -> bool {
    line.contains(markers::TYPE) || line.contains(markers::HIDDEN)
}

/// Extract the variable name and character location from a `Column:` line.
///
/// `"Column: 1-2 SAS Variable Name: _STATE"` gives `_STATE` at `1-2`.
pub fn field_context(line: &str) -> Option<FieldContext> {
    let (_, name) = line.split_once(markers::SAS_VARIABLE_PREFIX)?;
    let (_, after_column) = line.split_once(markers::COLUMN_PREFIX)?;
    let location = after_column
        .split_once(markers::SAS_VARIABLE_SUFFIX)
        .map_or(after_column, |(location, _)| location);

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(FieldContext {
        name: name.to_string(),
        location: location.trim().to_string(),
    })
}

/// Lines inside a listing that never hold value data
pub fn is_extraneous(line: &str) -> bool {
    line.is_empty()
        || line == markers::WEIGHTED
        || line == markers::PERCENTAGE
        || line.contains(markers::NOTES)
        || line.contains(markers::IS_CODED)
        || line.contains(markers::VALUE_TABLE_HEADER)
}

/// Whether a physical line ends a logical value row.
///
/// A finished row ends with the weighted percentage, e.g. `11.98`. The final
/// character is ignored so a sentence-ending period does not count.
pub fn completes_row(line: &str) -> bool {
    let last = line.rsplit(' ').next().unwrap_or_default().trim();
    let mut chars = last.chars();
    chars.next_back();
    chars.as_str().contains('.')
}

/// Drop frequency, percentage and weighted percentage from a complete row
pub fn strip_stat_columns(row: &str) -> &str {
    row.rsplitn(TRAILING_STAT_COLUMNS + 1, ' ')
        .last()
        .unwrap_or_default()
}

/// Split `"<value> <label>"` into a codebook key and label.
///
/// The missing-answer row maps the blank code regardless of its label.
/// Skip-pattern instructions (`Go to ...`) are cut from the label.
pub fn split_value_label(value_row: &str) -> Option<(String, String)> {
    let (key, label) = match value_row.split_once(' ') {
        Some((key, label)) => (key.trim(), Some(label)),
        None => (value_row.trim(), None),
    };

    if key == markers::BLANK {
        return Some((BLANK_KEY.to_string(), BLANK_LABEL.to_string()));
    }

    let label = label?;
    let label = label
        .split(markers::GO_TO)
        .next()
        .unwrap_or_default()
        .trim();

    if key.is_empty() || label.is_empty() {
        return None;
    }
    Some((key.to_string(), label.to_string()))
}

/// Keys to store for a value code.
///
/// One-character codes are also stored zero-padded since the response file
/// holds some codes flush and some padded to two characters.
pub fn codebook_keys(key: &str) -> Vec<String> {
    let mut keys = vec![key.to_string()];
    if key != BLANK_KEY && key.chars().count() == 1 {
        keys.push(format!("0{}", key));
    }
    keys
}
