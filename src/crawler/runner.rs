//! Bounded-concurrency batch runner
//!
//! This module fetches and extracts a list of listing pages:
//! - One task per URL, all created up front
//! - Admission through a semaphore, so at most `concurrency_limit` tasks are
//!   fetching or extracting at any moment
//! - A per-fetch timeout so a hung request only holds its own slot
//! - Per-task result ownership, merged in input order once every task is done
//!
//! A failing URL never aborts its siblings. Whether failures should fail the
//! whole run is left to the caller (see [`BatchOutcome`]).

use crate::config::Config;
use crate::crawler::extractor::FieldExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::record::{BatchOutcome, FetchFailure, FetchResult, ProductRecord};
use crate::{ConfigError, ErrorKind};
use futures::future::join_all;
use scraper::Html;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Default number of listings processed at the same time
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default bound on a single fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs fetch+extract for a batch of listing URLs under a concurrency cap
#[derive(Debug, Clone)]
pub struct BatchRunner {
    extractor: FieldExtractor,
    concurrency_limit: usize,
    fetch_timeout: Duration,
}

impl BatchRunner {
    /// Creates a runner with the default limit and timeout
    pub fn new(extractor: FieldExtractor) -> Self {
        Self {
            extractor,
            concurrency_limit: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Creates a runner from the `[harvest]` and `[selectors]` configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let extractor = FieldExtractor::from_config(config)?;
        Ok(Self::new(extractor)
            .with_concurrency_limit(config.harvest.max_concurrent_pages_open as usize)
            .with_fetch_timeout(Duration::from_secs(config.harvest.request_timeout_secs)))
    }

    /// Sets the concurrency limit (at least 1)
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Sets the upper bound on a single fetch
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Fetches and extracts every URL
    ///
    /// The returned outcome holds exactly one entry per input URL, either a
    /// record or a failure, each list in input order.
    ///
    /// Tasks run cooperatively on the calling task. Dropping the returned
    /// future abandons in-flight fetches and discards every partial result.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared by all tasks, never mutated
    /// * `urls` - Listing URLs; may be empty
    pub async fn run<F>(&self, fetcher: &F, urls: &[String]) -> BatchOutcome
    where
        F: PageFetcher + ?Sized,
    {
        if urls.is_empty() {
            tracing::info!("No listing URLs to fetch");
            return BatchOutcome::default();
        }

        tracing::info!(
            "Fetching {} listings with up to {} in flight",
            urls.len(),
            self.concurrency_limit
        );
        let start_time = Instant::now();

        let semaphore = Semaphore::new(self.concurrency_limit);
        let tasks = urls
            .iter()
            .map(|url| self.process_url(fetcher, &semaphore, url));
        let outcome: BatchOutcome = join_all(tasks).await.into_iter().collect();

        tracing::info!(
            "Batch finished in {:?}: {} parsed, {} failed",
            start_time.elapsed(),
            outcome.successes.len(),
            outcome.failures.len()
        );

        outcome
    }

    /// Processes a single URL once a concurrency slot is free
    async fn process_url<F>(&self, fetcher: &F, semaphore: &Semaphore, url: &str) -> FetchResult
    where
        F: PageFetcher + ?Sized,
    {
        // The permit is held for fetch and extraction
        let _permit = match semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return FetchResult::Failed(FetchFailure {
                    url: url.to_string(),
                    kind: ErrorKind::Transport("concurrency limiter closed".to_string()),
                })
            }
        };

        match self.fetch_and_extract(fetcher, url).await {
            Ok(record) => {
                tracing::debug!("Parsed listing {}", url);
                FetchResult::Parsed(record)
            }
            Err(kind) => {
                tracing::warn!("Failed to harvest {}: {}", url, kind);
                FetchResult::Failed(FetchFailure {
                    url: url.to_string(),
                    kind,
                })
            }
        }
    }

    async fn fetch_and_extract<F>(&self, fetcher: &F, url: &str) -> Result<ProductRecord, ErrorKind>
    where
        F: PageFetcher + ?Sized,
    {
        let body = tokio::time::timeout(self.fetch_timeout, fetcher.fetch(url))
            .await
            .map_err(|_| {
                ErrorKind::Transport(format!("request timed out after {:?}", self.fetch_timeout))
            })??;

        let page = Html::parse_document(&body);
        let listing = self.extractor.extract_listing(&page)?;

        // Give other tasks a chance to start their requests before the
        // price and shipping rules run
        tokio::task::yield_now().await;

        let pricing = self.extractor.extract_pricing(&page)?;
        Ok(listing.into_record(pricing, url))
    }
}
