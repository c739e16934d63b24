//! Crawler module for listing discovery, fetching and extraction
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching behind the [`PageFetcher`] seam
//! - Listing link discovery on the search-results page
//! - Field extraction with ordered price and shipping rules
//! - Bounded-concurrency batch processing
//! - Overall harvest coordination

mod discovery;
mod extractor;
mod fetcher;
#[cfg(test)]
mod fixtures;
mod pipeline;
mod record;
mod runner;

pub use discovery::LinkDiscovery;
pub use extractor::{
    parse_dollar_amount, FieldExtractor, ListingFields, PageSelectors, PriceRule, PricingFields,
    ShippingRule, PRICE_RULES, SHIPPING_RULES,
};
pub use fetcher::{build_http_client, fetch_url, HttpFetcher, PageFetcher};
pub use pipeline::{harvest, run_harvest, HarvestReport};
pub use record::{BatchOutcome, FetchFailure, FetchResult, ProductRecord};
pub use runner::{BatchRunner, DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT};
