//! Flat-file table I/O.
//!
//! Every table is a comma-separated file with a header row. Readers map
//! rows onto serde types by header name; writers emit the header from
//! [`CsvRecord::HEADERS`] first so empty tables are still well formed.

use crate::model::CsvRecord;
use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read every row of a CSV file with a header row.
///
/// # Errors
///
/// Fails if the file is missing or any row does not match `T`.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<T>().enumerate() {
        // +2: one for the header, one for 1-based line numbers.
        let row: T = row.with_context(|| {
            format!("Malformed row at line {} of {}", index + 2, path.display())
        })?;
        rows.push(row);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write `rows` to `path`, header first, creating parent directories.
///
/// # Errors
///
/// Fails if the directory or file cannot be created or written.
pub fn write_rows<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer
        .write_record(T::HEADERS)
        .with_context(|| format!("Failed to write header to {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
