//! Result sink traits and types
//!
//! This module defines the trait interface for result sinks and the errors
//! they report.

use crate::crawler::ProductRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Consumes the final record list of a harvest
pub trait ResultSink {
    /// Persists the records, replacing any previous output
    ///
    /// # Arguments
    ///
    /// * `records` - Successfully extracted listings, in discovery order
    fn write_records(&self, records: &[ProductRecord]) -> OutputResult<()>;

    /// Human-readable destination, used in log messages
    fn destination(&self) -> String;
}
