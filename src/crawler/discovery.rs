//! Listing link discovery
//!
//! Fetches the configured search-results page and collects the listing URLs
//! inside the results container. Any failure here is fatal to the run: there
//! is nothing to harvest without the URL list.
//!
//! # Link Rules
//!
//! **Include:**
//! - `href` of every result anchor inside the results container
//! - Relative links, resolved against the search URL
//!
//! **Exclude:**
//! - Anchors outside the results container (ads, carousels)
//! - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only links
//! - Non-HTTP(S) URLs after resolution
//!
//! Query strings and fragments are dropped (they only carry tracking
//! parameters) and duplicates are removed, keeping first-seen order.

use crate::config::Config;
use crate::crawler::extractor::{is_blocked_page, PageSelectors};
use crate::crawler::fetcher::PageFetcher;
use crate::{ConfigError, ErrorKind, ScoutError};
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Produces the listing URLs of one search-results page
#[derive(Debug, Clone)]
pub struct LinkDiscovery {
    search_url: Url,
    selectors: PageSelectors,
    blocked_title: String,
}

impl LinkDiscovery {
    pub fn new(search_url: Url, selectors: PageSelectors, blocked_title: &str) -> Self {
        Self {
            search_url,
            selectors,
            blocked_title: blocked_title.trim().to_lowercase(),
        }
    }

    /// Creates a discovery step from the `[search]` and `[selectors]` configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let search_url = Url::parse(&config.search.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid search url '{}': {}", config.search.url, e))
        })?;
        let selectors = PageSelectors::compile(&config.selectors)?;
        Ok(Self::new(search_url, selectors, &config.search.blocked_title))
    }

    /// Fetches the search page and returns its listing URLs
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Absolute listing URLs, possibly empty
    /// * `Err(ScoutError::Blocked)` - The marketplace served its "access denied" page
    /// * `Err(ScoutError::Discovery)` - Fetch failed or the results container is missing
    pub async fn discover<F>(&self, fetcher: &F) -> Result<Vec<String>, ScoutError>
    where
        F: PageFetcher + ?Sized,
    {
        tracing::info!("Fetching search page {}", self.search_url);

        let body = fetcher
            .fetch(self.search_url.as_str())
            .await
            .map_err(|kind| ScoutError::Discovery {
                url: self.search_url.to_string(),
                kind,
            })?;

        let urls = self.extract_listing_urls(&body)?;
        tracing::info!("Discovered {} listing URLs", urls.len());
        Ok(urls)
    }

    /// Extracts listing URLs from search page markup
    pub fn extract_listing_urls(&self, html: &str) -> Result<Vec<String>, ScoutError> {
        let document = Html::parse_document(html);

        if is_blocked_page(&document, &self.selectors, &self.blocked_title) {
            return Err(ScoutError::Blocked {
                url: self.search_url.to_string(),
            });
        }

        let container = document
            .select(&self.selectors.results_container)
            .next()
            .ok_or_else(|| ScoutError::Discovery {
                url: self.search_url.to_string(),
                kind: ErrorKind::MissingField("search results"),
            })?;

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for element in container.select(&self.selectors.result_link) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            match resolve_listing_link(href, &self.search_url) {
                Some(link) => {
                    if seen.insert(link.clone()) {
                        links.push(link);
                    }
                }
                None => tracing::debug!("Skipping result link {:?}", href),
            }
        }

        Ok(links)
    }
}

/// Resolves a result href to an absolute listing URL without query or fragment
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_listing_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_query(None);
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
