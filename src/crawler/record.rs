//! Records produced by a harvest
//!
//! A [`ProductRecord`] is built once per successfully extracted listing and
//! never modified afterwards. Failed listings are reported as
//! [`FetchFailure`]s instead; there is no partially populated record.

use crate::ErrorKind;
use serde::{Deserialize, Serialize};

/// Structured attributes of one listing
///
/// Field order is the key order of the JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_name: String,
    pub seller_name: String,
    pub image_link: String,
    pub price_dollars: f64,
    /// `None` when the listing offers no shipping (or free shipping), not when
    /// the value could not be parsed
    pub shipping_cost_dollars: Option<f64>,
    /// The listing URL the record was fetched from
    pub product_link: String,
}

/// A listing that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub kind: ErrorKind,
}

/// Outcome of a single fetch+extract task
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Parsed(ProductRecord),
    Failed(FetchFailure),
}

/// Merged outcome of a batch, both lists in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub successes: Vec<ProductRecord>,
    pub failures: Vec<FetchFailure>,
}

impl BatchOutcome {
    /// Number of URLs the batch was given
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// True when every listing produced a record
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl FromIterator<FetchResult> for BatchOutcome {
    fn from_iter<I: IntoIterator<Item = FetchResult>>(iter: I) -> Self {
        let mut outcome = BatchOutcome::default();
        for result in iter {
            match result {
                FetchResult::Parsed(record) => outcome.successes.push(record),
                FetchResult::Failed(failure) => outcome.failures.push(failure),
            }
        }
        outcome
    }
}
