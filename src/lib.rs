//! Listing-Scout: a marketplace listing harvester
//!
//! This crate discovers product listing pages on an eBay search-results page,
//! fetches every listing under a concurrency cap, extracts name, seller, image,
//! price and shipping cost from each one, and writes the results as JSON.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Listing-Scout runs
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Marketplace blocked the request to {url} (served its anti-automation page)")]
    Blocked { url: String },

    #[error("Link discovery failed for {url}: {kind}")]
    Discovery { url: String, kind: ErrorKind },

    #[error("{failed} of {total} listings failed and fail-on-error is set")]
    BatchFailed { failed: usize, total: usize },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Classification of a single page fetch or extraction failure
///
/// These are per-URL outcomes: the batch runner records them next to the
/// failing URL and keeps going with the other listings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("could not decode response body: {0}")]
    Decode(String),

    #[error("request blocked by the marketplace")]
    Blocked,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("no approximate or primary price found")]
    PriceNotFound,

    #[error("no shipping cost found")]
    ShippingNotFound,

    #[error("malformed number: {0:?}")]
    MalformedNumber(String),
}

impl ErrorKind {
    /// Short stable label used when grouping failures in statistics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::HttpStatus(_) => "http_status",
            Self::Decode(_) => "decode",
            Self::Blocked => "blocked",
            Self::MissingField(_) => "missing_field",
            Self::PriceNotFound => "price_not_found",
            Self::ShippingNotFound => "shipping_not_found",
            Self::MalformedNumber(_) => "malformed_number",
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {name}: {selector}")]
    InvalidSelector { name: &'static str, selector: String },
}

/// Result type alias for Listing-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchOutcome, BatchRunner, FetchFailure, FieldExtractor, ProductRecord};
