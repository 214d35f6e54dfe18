//! CSV loading
//!
//! Every column is parsed as a number and the last column is the label.
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

use super::dataset::Dataset;
use crate::error::{ForestError, Result};

/// Reads a numeric CSV file into a dataset.
///
/// # Arguments
///
/// * `file_path` - Path of the CSV file.
/// * `header` - Whether the first line is a header to skip.
///
/// # Errors
///
/// Fails when the file can't be read, when a field isn't a number, or when
/// the rows don't form a valid dataset.
pub fn read_csv<P: AsRef<Path>>(file_path: P, header: bool) -> Result<Dataset<f64>> {
    let reader = ReaderBuilder::new()
        .has_headers(header)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file_path)?;
    read_records(reader)
}

/// Same as [`read_csv`], over any reader.
pub fn read_csv_from_reader<R: Read>(source: R, header: bool) -> Result<Dataset<f64>> {
    let reader = ReaderBuilder::new()
        .has_headers(header)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);
    read_records(reader)
}

/// Row numbers in errors count CSV records, skipped blank records included.
fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Dataset<f64>> {
    let mut rows = Vec::new();
    let mut width = None;

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(ForestError::RaggedRow {
                row,
                expected,
                found: record.len(),
            });
        }
        let values = record
            .iter()
            .enumerate()
            .map(|(column, field)| {
                field.parse::<f64>().map_err(|_| ForestError::ParseValue {
                    row,
                    column,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(values);
    }

    Dataset::from_rows(&rows)
}
