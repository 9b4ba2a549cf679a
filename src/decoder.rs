//! Fixed-width record decoding and CSV output.
//!
//! Each record is one line of text; a field is the character range given by
//! the position table. The sliced value is replaced by its codebook label when
//! one exists and passed through unchanged otherwise.

use crate::error::{DecoderError, Result};
use crate::models::{FieldDictionary, FieldSpec};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, warn};

/// Slice `start..end` out of a record by character offsets.
///
/// Records shorter than `end` give whatever is available.
pub fn slice_field(record: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    if record.is_ascii() {
        let len = record.len();
        return &record[start.min(len)..end.min(len)];
    }

    let mut offsets = record
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(record.len()));
    let Some(begin) = offsets.nth(start) else {
        return "";
    };
    let finish = offsets.nth(end - start - 1).unwrap_or(record.len());
    &record[begin..finish]
}

/// Decode one field of a record, falling back to the raw slice
pub fn decode_value(spec: &FieldSpec, record: &str) -> Option<String> {
    let (start, end) = spec.range()?;
    let raw = slice_field(record, start, end);
    Some(spec.label(raw).unwrap_or(raw).to_string())
}

/// Decode the named fields of a record. Fields without positions are left out.
pub fn decode_record(
    record: &str,
    dictionary: &FieldDictionary,
    fields: &[String],
) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter_map(|name| {
            let spec = dictionary.get(name)?;
            decode_value(spec, record).map(|value| (name.clone(), value))
        })
        .collect()
}

/// Decodes records into columns for a fixed selection of fields
pub struct RecordDecoder<'a> {
    fields: Vec<&'a FieldSpec>,
}

impl<'a> RecordDecoder<'a> {
    /// Select the fields of interest that can be decoded, in the requested order
    pub fn new(dictionary: &'a FieldDictionary, fields_of_interest: &[String]) -> Self {
        let fields = fields_of_interest
            .iter()
            .filter_map(|name| match dictionary.get(name) {
                Some(spec) if spec.range().is_some() => Some(spec),
                Some(_) => {
                    warn!("Field {} has no position in the record layout, skipping", name);
                    None
                }
                None => {
                    warn!("Field {} not found in position table or codebook, skipping", name);
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Decoding {} of {} requested fields",
            fields.len(),
            fields_of_interest.len()
        );
        Self { fields }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|spec| spec.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode a record into one value per selected field
    pub fn decode(&self, record: &str) -> Vec<String> {
        self.fields
            .iter()
            .map(|spec| decode_value(spec, record).unwrap_or_default())
            .collect()
    }

    /// Decode every non-blank line of `reader` into a data frame.
    ///
    /// `on_record` is called after each decoded record, e.g. to advance a
    /// progress bar.
    pub fn decode_records<R: BufRead>(
        &self,
        reader: R,
        source: &Path,
        mut on_record: impl FnMut(usize),
    ) -> Result<DataFrame> {
        let mut columns: Vec<Vec<String>> = vec![Vec::new(); self.fields.len()];
        let mut decoded = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let record = line.map_err(|e| DecoderError::RecordRead {
                path: source.to_path_buf(),
                line: line_num + 1,
                reason: e.to_string(),
            })?;
            if record.trim().is_empty() {
                continue;
            }

            for (column, value) in columns.iter_mut().zip(self.decode(&record)) {
                column.push(value);
            }
            decoded += 1;
            on_record(decoded);
        }

        debug!("Decoded {} records from {}", decoded, source.display());
        self.into_frame(columns)
    }

    fn into_frame(&self, columns: Vec<Vec<String>>) -> Result<DataFrame> {
        let columns = self
            .fields
            .iter()
            .zip(columns)
            .map(|(spec, values)| Column::new(spec.name.as_str().into(), values))
            .collect::<Vec<_>>();
        Ok(DataFrame::new(columns)?)
    }
}

/// Write decoded records as CSV with a header row
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
