//! Output module for harvest results
//!
//! This module handles:
//! - Writing product records as a JSON array
//! - Summarizing and printing run statistics

mod json;
pub mod stats;
mod traits;

pub use json::{format_products_json, write_products, write_products_json, JsonFileSink};
pub use stats::{print_statistics, HarvestStatistics};
pub use traits::{OutputError, OutputResult, ResultSink};
