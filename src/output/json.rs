//! JSON output of product records
//!
//! Records are written as one pretty-printed JSON array. An empty harvest
//! produces `[]`, and `shipping_cost_dollars` is `null` for listings without
//! shipping.

use crate::crawler::ProductRecord;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// [`ResultSink`] writing a JSON array to a file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn write_records(&self, records: &[ProductRecord]) -> OutputResult<()> {
        write_products_json(records, &self.path)
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes records to `output_path` as a JSON array
///
/// Parent directories are created when missing. The file is streamed through
/// a buffered writer rather than built in memory first.
///
/// # Arguments
///
/// * `records` - The records to write
/// * `output_path` - Path of the JSON file, replaced if it exists
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_products_json(records: &[ProductRecord], output_path: &Path) -> OutputResult<()> {
    let write_error = |source: std::io::Error| OutputError::Write {
        path: output_path.display().to_string(),
        source,
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
    }

    let file = File::create(output_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    write_products(&mut writer, records)?;
    writer.flush().map_err(write_error)?;

    tracing::info!(
        "Wrote {} records to {}",
        records.len(),
        output_path.display()
    );
    Ok(())
}

/// Serializes records as a pretty-printed JSON array into any writer
pub fn write_products<W: Write>(writer: W, records: &[ProductRecord]) -> OutputResult<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Formats records as a pretty-printed JSON array
pub fn format_products_json(records: &[ProductRecord]) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
