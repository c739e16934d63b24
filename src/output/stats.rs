//! Statistics for a harvest run
//!
//! This module summarizes a [`BatchOutcome`] and prints it to stdout at the
//! end of a run.

use crate::crawler::BatchOutcome;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Number of listing URLs discovered
    pub total_urls: u64,

    /// Listings turned into records
    pub parsed: u64,

    /// Listings that failed
    pub failed: u64,

    /// Failure counts by error category
    pub failures_by_kind: BTreeMap<&'static str, u64>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl HarvestStatistics {
    /// Builds statistics for an outcome produced between the two timestamps
    pub fn from_outcome(
        outcome: &BatchOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut failures_by_kind = BTreeMap::new();
        for failure in &outcome.failures {
            *failures_by_kind.entry(failure.kind.category()).or_insert(0) += 1;
        }

        Self {
            total_urls: outcome.total() as u64,
            parsed: outcome.successes.len() as u64,
            failed: outcome.failures.len() as u64,
            failures_by_kind,
            started_at,
            finished_at,
        }
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_urls == 0 {
            return 0.0;
        }
        (self.parsed as f64 / self.total_urls as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Duration: {:.2} seconds", stats.duration_seconds());
    println!("  Listing URLs discovered: {}", stats.total_urls);
    println!("  Records extracted: {}", stats.parsed);
    println!("  Failed listings: {}", stats.failed);
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failures by Kind:");
        let mut kind_counts: Vec<_> = stats.failures_by_kind.iter().collect();
        kind_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in kind_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} listings extracted)",
        stats.success_rate(),
        stats.parsed,
        stats.total_urls
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchFailure;
    use crate::ErrorKind;
    use chrono::Duration;

    fn failure(kind: ErrorKind) -> FetchFailure {
        FetchFailure {
            url: "https://www.ebay.com/itm/1".to_string(),
            kind,
        }
    }

    #[test]
    fn test_statistics_from_outcome() {
        let outcome = BatchOutcome {
            successes: vec![],
            failures: vec![
                failure(ErrorKind::HttpStatus(404)),
                failure(ErrorKind::HttpStatus(500)),
                failure(ErrorKind::PriceNotFound),
            ],
        };
        let started = Utc::now();
        let finished = started + Duration::seconds(3);
        let stats = HarvestStatistics::from_outcome(&outcome, started, finished);

        assert_eq!(stats.total_urls, 3);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.failures_by_kind.get("http_status"), Some(&2));
        assert_eq!(stats.failures_by_kind.get("price_not_found"), Some(&1));
        assert_eq!(stats.duration_seconds(), 3.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_success_rate_of_empty_run() {
        let now = Utc::now();
        let stats = HarvestStatistics::from_outcome(&BatchOutcome::default(), now, now);
        assert_eq!(stats.success_rate(), 0.0);
        assert!(stats.failures_by_kind.is_empty());
    }
}
