//! Core data structures for codebook extraction and decoding.
//!
//! Defines the per-field specification, the field dictionary that merges
//! position-table and codebook data, and processing statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::PathBuf;
use std::time::Duration;

/// Everything known about one survey field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Zero-based start offset in a fixed-width record
    pub start_position: Option<usize>,
    /// Exclusive end offset in a fixed-width record
    pub end_position: Option<usize>,
    pub description: Option<String>,
    /// Raw "Column:" text from the codebook, e.g. "1-2"
    pub location: Option<String>,
    /// Encoded value to label
    pub codebook: BTreeMap<String, String>,
}

impl FieldSpec {
    /// Create an empty field with no positions or codebook
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a field located at `start..end` in each record
    pub fn with_range(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            start_position: Some(start),
            end_position: Some(end),
            ..Self::new(name)
        }
    }

    /// Character range in a record, if the position table supplied one
    pub fn range(&self) -> Option<(usize, usize)> {
        match (self.start_position, self.end_position) {
            (Some(start), Some(end)) if end > start => Some((start, end)),
            _ => None,
        }
    }

    /// Width of the field in characters
    pub fn width(&self) -> Option<usize> {
        self.range().map(|(start, end)| end - start)
    }

    /// Label for an encoded value
    pub fn label(&self, key: &str) -> Option<&str> {
        self.codebook.get(key).map(String::as_str)
    }
}

/// All fields keyed by name, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDictionary {
    fields: BTreeMap<String, FieldSpec>,
}

impl FieldDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Insert or replace a field
    pub fn insert(&mut self, spec: FieldSpec) {
        self.fields.insert(spec.name.clone(), spec);
    }

    /// Fetch a field, creating an empty one the first time a name is seen
    pub fn entry(&mut self, name: &str) -> &mut FieldSpec {
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| FieldSpec::new(name))
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, FieldSpec> {
        self.fields.values()
    }

    /// Fields that can be sliced out of a record
    pub fn positioned(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values().filter(|spec| spec.range().is_some())
    }

    /// Number of fields with at least one value/label pair
    pub fn with_codebook_count(&self) -> usize {
        self.fields
            .values()
            .filter(|spec| !spec.codebook.is_empty())
            .count()
    }

    /// Merge codebook-derived attributes onto this dictionary.
    ///
    /// Positions already present are kept; labels, description and location
    /// come from `parsed`. Fields only known to the codebook are added.
    pub fn merge_codebook(&mut self, parsed: FieldDictionary) {
        for (name, spec) in parsed.fields {
            let target = self.entry(&name);
            target.codebook.extend(spec.codebook);
            if spec.description.is_some() {
                target.description = spec.description;
            }
            if spec.location.is_some() {
                target.location = spec.location;
            }
            if target.start_position.is_none() {
                target.start_position = spec.start_position;
                target.end_position = spec.end_position;
            }
        }
    }
}

impl<'a> IntoIterator for &'a FieldDictionary {
    type Item = &'a FieldSpec;
    type IntoIter = btree_map::Values<'a, String, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.values()
    }
}

impl FromIterator<FieldSpec> for FieldDictionary {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        for spec in iter {
            dictionary.insert(spec);
        }
        dictionary
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub fields_loaded: usize,
    pub fields_with_codebook: usize,
    pub columns_written: usize,
    pub records_decoded: usize,
    pub diagnostics: usize,
    pub output_path: PathBuf,
    pub processing_time: Duration,
}
