//! Field position table loading.
//!
//! The position table lists every variable with its 1-based starting column
//! and width in the fixed-width response file. It is converted to zero-based,
//! end-exclusive character ranges.

use crate::constants::position_columns::{FIELD_LENGTH, STARTING_COLUMN, VARIABLE_NAME};
use crate::error::{DecoderError, Result};
use crate::models::{FieldDictionary, FieldSpec};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Load the position table at `path` into a field dictionary
pub fn load_position_table(path: &Path, separator: u8) -> Result<FieldDictionary> {
    if !path.exists() {
        return Err(DecoderError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .map_err(|e| DecoderError::malformed_table(path, e.to_string()))?;

    debug!(
        "Read position table {}: {} rows, columns {:?}",
        path.display(),
        df.height(),
        df.get_column_names()
    );

    positions_from_frame(&df, path)
}

/// Build field ranges from an already loaded position table
pub fn positions_from_frame(df: &DataFrame, source: &Path) -> Result<FieldDictionary> {
    let names = string_column(df, VARIABLE_NAME, source)?;
    let starts = integer_column(df, STARTING_COLUMN, source)?;
    let lengths = integer_column(df, FIELD_LENGTH, source)?;

    let mut dictionary = FieldDictionary::new();
    for (row, ((name, start), length)) in names
        .into_iter()
        .zip(starts.into_iter())
        .zip(lengths.into_iter())
        .enumerate()
    {
        let name = name.map(str::trim).filter(|n| !n.is_empty()).ok_or_else(|| {
            DecoderError::malformed_table(source, format!("row {}: missing {}", row + 1, VARIABLE_NAME))
        })?;
        let (start, end) = field_range(start, length)
            .map_err(|reason| DecoderError::malformed_table(source, format!("row {}: {}", row + 1, reason)))?;

        dictionary.insert(FieldSpec::with_range(name, start, end));
    }

    debug!("Loaded positions for {} fields", dictionary.len());
    Ok(dictionary)
}

/// Convert a 1-based starting column and a width into `start..end`
fn field_range(
    starting_column: Option<i64>,
    field_length: Option<i64>,
) -> std::result::Result<(usize, usize), String> {
    let starting_column = starting_column.ok_or_else(|| format!("missing {}", STARTING_COLUMN))?;
    let field_length = field_length.ok_or_else(|| format!("missing {}", FIELD_LENGTH))?;

    if starting_column < 1 {
        return Err(format!("{} must be at least 1, got {}", STARTING_COLUMN, starting_column));
    }
    if field_length < 1 {
        return Err(format!("{} must be at least 1, got {}", FIELD_LENGTH, field_length));
    }

    let start = (starting_column - 1) as usize;
    Ok((start, start + field_length as usize))
}

fn required_column<'a>(df: &'a DataFrame, name: &str, source: &Path) -> Result<&'a Series> {
    df.column(name)
        .map(Column::as_materialized_series)
        .map_err(|_| DecoderError::malformed_table(source, format!("missing required column '{}'", name)))
}

fn string_column(df: &DataFrame, name: &str, source: &Path) -> Result<StringChunked> {
    let series = required_column(df, name, source)?.cast(&DataType::String)?;
    Ok(series.str()?.clone())
}

fn integer_column(df: &DataFrame, name: &str, source: &Path) -> Result<Int64Chunked> {
    let series = required_column(df, name, source)?
        .strict_cast(&DataType::Int64)
        .map_err(|_| DecoderError::malformed_table(source, format!("column '{}' is not numeric", name)))?;
    Ok(series.i64()?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_field_range_is_zero_based_and_exclusive() {
        assert_eq!(field_range(Some(1), Some(2)), Ok((0, 2)));
        assert_eq!(field_range(Some(73), Some(1)), Ok((72, 73)));
        assert!(field_range(Some(0), Some(2)).is_err());
        assert!(field_range(Some(5), Some(0)).is_err());
        assert!(field_range(None, Some(2)).is_err());
    }

    #[test]
    fn test_positions_from_frame() {
        let df = df!(
            "Variable Name" => ["_STATE", "FMONTH", "HADMAM"],
            "Starting Column" => [1i64, 17, 112],
            "Field Length" => [2i64, 2, 1],
        )
        .unwrap();

        let dictionary = positions_from_frame(&df, Path::new("memory")).unwrap();

        assert_eq!(dictionary.len(), 3);
        for (name, declared_start, declared_length) in
            [("_STATE", 1, 2), ("FMONTH", 17, 2), ("HADMAM", 112, 1)]
        {
            let spec = dictionary.get(name).unwrap();
            assert_eq!(spec.start_position, Some(declared_start - 1));
            assert_eq!(spec.width(), Some(declared_length));
            assert!(spec.codebook.is_empty());
        }
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let df = df!(
            "Variable Name" => ["_STATE"],
            "Starting Column" => [1i64],
        )
        .unwrap();

        let err = positions_from_frame(&df, Path::new("memory")).unwrap_err();
        assert!(matches!(err, DecoderError::MalformedTable { .. }));
        assert!(err.to_string().contains("Field Length"));
    }

    #[test]
    fn test_non_numeric_position_is_malformed() {
        let df = df!(
            "Variable Name" => ["_STATE"],
            "Starting Column" => ["one"],
            "Field Length" => [2i64],
        )
        .unwrap();

        let err = positions_from_frame(&df, Path::new("memory")).unwrap_err();
        assert!(matches!(err, DecoderError::MalformedTable { .. }));
    }

    #[test]
    fn test_load_tab_delimited_table() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Starting Column\tVariable Name\tField Length").unwrap();
        writeln!(temp_file, "1\t_STATE\t2").unwrap();
        writeln!(temp_file, "36\tSEQNO\t10").unwrap();
        temp_file.flush().unwrap();

        let dictionary = load_position_table(temp_file.path(), b'\t').unwrap();

        let seqno = dictionary.get("SEQNO").unwrap();
        assert_eq!(seqno.range(), Some((35, 45)));
        assert_eq!(dictionary.get("_STATE").unwrap().range(), Some((0, 2)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_position_table(Path::new("/nonexistent/positions.txt"), b'\t').unwrap_err();
        assert!(matches!(err, DecoderError::FileNotFound { .. }));
    }
}
