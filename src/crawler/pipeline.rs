//! End-to-end harvest pipeline
//!
//! This module ties the harvest together:
//! 1. Discover listing URLs on the search page
//! 2. Fetch and extract every listing under the concurrency cap
//! 3. Apply the failure policy
//! 4. Hand the records to the result sink
//! 5. Summarize the run
//!
//! Link discovery failures and sink failures end the run. Listing failures
//! only do so when `fail-on-error` is set, and then nothing is written.

use crate::config::Config;
use crate::crawler::discovery::LinkDiscovery;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::record::BatchOutcome;
use crate::crawler::runner::BatchRunner;
use crate::output::{HarvestStatistics, JsonFileSink, ResultSink};
use crate::ScoutError;
use chrono::Utc;
use std::path::Path;

/// What a finished harvest produced
#[derive(Debug)]
pub struct HarvestReport {
    pub outcome: BatchOutcome,
    pub statistics: HarvestStatistics,
}

/// Runs a complete harvest from configuration
///
/// Builds the HTTP fetcher, the discovery step, the batch runner and the
/// JSON sink from `config`, then calls [`run_harvest`].
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Records were written (possibly an empty array)
/// * `Err(ScoutError)` - Discovery, the failure policy or the sink failed
///
/// # Example
///
/// ```no_run
/// use listing_scout::config::load_config;
/// use listing_scout::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scout.toml"))?;
/// let report = harvest(&config).await?;
/// println!("{} records", report.outcome.successes.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config) -> Result<HarvestReport, ScoutError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.harvest)?;
    let discovery = LinkDiscovery::from_config(config)?;
    let runner = BatchRunner::from_config(config)?;
    let sink = JsonFileSink::new(Path::new(&config.output.json_path));

    run_harvest(
        &fetcher,
        &discovery,
        &runner,
        &sink,
        config.harvest.fail_on_error,
    )
    .await
}

/// Runs a harvest with explicit components
///
/// # Arguments
///
/// * `fetcher` - Used for the search page and every listing
/// * `discovery` - Produces the listing URLs
/// * `runner` - Fetches and extracts the listings
/// * `sink` - Receives the successful records, in discovery order
/// * `fail_on_error` - Turn any listing failure into [`ScoutError::BatchFailed`]
pub async fn run_harvest<F, S>(
    fetcher: &F,
    discovery: &LinkDiscovery,
    runner: &BatchRunner,
    sink: &S,
    fail_on_error: bool,
) -> Result<HarvestReport, ScoutError>
where
    F: PageFetcher + ?Sized,
    S: ResultSink + ?Sized,
{
    let started_at = Utc::now();

    let urls = discovery.discover(fetcher).await?;
    let outcome = runner.run(fetcher, &urls).await;

    for failure in &outcome.failures {
        tracing::debug!("{} [{}]: {}", failure.url, failure.kind.category(), failure.kind);
    }

    if fail_on_error && !outcome.is_complete() {
        return Err(ScoutError::BatchFailed {
            failed: outcome.failures.len(),
            total: outcome.total(),
        });
    }

    sink.write_records(&outcome.successes)?;
    tracing::info!(
        "Saved {} records to {}",
        outcome.successes.len(),
        sink.destination()
    );

    let statistics = HarvestStatistics::from_outcome(&outcome, started_at, Utc::now());
    Ok(HarvestReport {
        outcome,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::crawler::extractor::{FieldExtractor, PageSelectors};
    use crate::crawler::fixtures::{listing_html, search_html, BOLD_SHIPPING, PRIMARY_PRICE};
    use crate::crawler::record::ProductRecord;
    use crate::output::OutputResult;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use url::Url;

    const SEARCH_URL: &str = "https://www.ebay.com/sch/i.html?_nkw=shoes";

    struct MapFetcher(HashMap<String, Result<String, ErrorKind>>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<String, ErrorKind> {
            self.0
                .get(url)
                .cloned()
                .unwrap_or(Err(ErrorKind::HttpStatus(404)))
        }
    }

    #[derive(Default)]
    struct MemorySink(Mutex<Option<Vec<ProductRecord>>>);

    impl ResultSink for MemorySink {
        fn write_records(&self, records: &[ProductRecord]) -> OutputResult<()> {
            *self.0.lock().unwrap() = Some(records.to_vec());
            Ok(())
        }

        fn destination(&self) -> String {
            "memory".to_string()
        }
    }

    fn components() -> (LinkDiscovery, BatchRunner) {
        let selectors = PageSelectors::compile(&SelectorConfig::default()).unwrap();
        let discovery = LinkDiscovery::new(
            Url::parse(SEARCH_URL).unwrap(),
            selectors.clone(),
            "access denied",
        );
        let runner = BatchRunner::new(FieldExtractor::new(selectors, "access denied"))
            .with_concurrency_limit(2);
        (discovery, runner)
    }

    fn fetcher() -> MapFetcher {
        let mut pages = HashMap::new();
        pages.insert(
            SEARCH_URL.to_string(),
            Ok(search_html(&[
                "https://www.ebay.com/itm/1?hash=x",
                "https://www.ebay.com/itm/2",
            ])),
        );
        pages.insert(
            "https://www.ebay.com/itm/1".to_string(),
            Ok(listing_html(PRIMARY_PRICE, BOLD_SHIPPING)),
        );
        MapFetcher(pages)
    }

    #[tokio::test]
    async fn test_partial_failure_still_writes_successes() {
        let (discovery, runner) = components();
        let sink = MemorySink::default();

        let report = run_harvest(&fetcher(), &discovery, &runner, &sink, false)
            .await
            .unwrap();

        let written = sink.0.lock().unwrap().clone().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].product_link, "https://www.ebay.com/itm/1");
        assert_eq!(report.statistics.total_urls, 2);
        assert_eq!(report.statistics.failed, 1);
        assert_eq!(report.outcome.failures[0].kind, ErrorKind::HttpStatus(404));
    }

    #[tokio::test]
    async fn test_fail_on_error_writes_nothing() {
        let (discovery, runner) = components();
        let sink = MemorySink::default();

        let result = run_harvest(&fetcher(), &discovery, &runner, &sink, true).await;

        assert!(matches!(
            result,
            Err(ScoutError::BatchFailed { failed: 1, total: 2 })
        ));
        assert!(sink.0.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_discovery_failure_is_fatal() {
        let (discovery, runner) = components();
        let sink = MemorySink::default();
        let fetcher = MapFetcher(HashMap::new());

        let result = run_harvest(&fetcher, &discovery, &runner, &sink, false).await;

        assert!(matches!(result, Err(ScoutError::Discovery { .. })));
        assert!(sink.0.lock().unwrap().is_none());
    }
}
