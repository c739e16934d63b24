//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared HTTP client with a proper user agent string
//! - GET requests for search and listing pages
//! - Error classification into [`ErrorKind`]
//!
//! There is no retry logic here. A failed fetch is reported once and the
//! batch runner records it against its URL.

use crate::config::{HarvestConfig, UserAgentConfig};
use crate::ErrorKind;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Retrieves raw page markup for a URL
///
/// Implementations are shared read-only by every concurrent task of a batch,
/// so they must be `Send + Sync` and must not keep per-request state.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Performs one GET request and returns the response body on a 2xx status
    async fn fetch(&self, url: &str) -> Result<String, ErrorKind>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration and wraps it
    pub fn from_config(
        user_agent: &UserAgentConfig,
        harvest: &HarvestConfig,
    ) -> Result<Self, reqwest::Error> {
        build_http_client(user_agent, harvest).map(Self::new)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ErrorKind> {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `harvest` - Timeouts are taken from here
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use listing_scout::config::{HarvestConfig, UserAgentConfig};
/// use listing_scout::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "ListingScout".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &HarvestConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    harvest: &HarvestConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(harvest.request_timeout_secs))
        .connect_timeout(Duration::from_secs(harvest.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies any failure
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | `Ok(body)` |
/// | Any other status | `ErrorKind::HttpStatus(code)` |
/// | Timeout, DNS, connect, reset | `ErrorKind::Transport` |
/// | Body cannot be read as text | `ErrorKind::Decode` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, ErrorKind> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_transport_error(&e))?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("GET {} returned HTTP {}", url, status.as_u16());
        return Err(ErrorKind::HttpStatus(status.as_u16()));
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            classify_transport_error(&e)
        } else {
            ErrorKind::Decode(e.to_string())
        }
    })
}

/// Maps a request-level `reqwest` error onto [`ErrorKind::Transport`]
fn classify_transport_error(e: &reqwest::Error) -> ErrorKind {
    if e.is_timeout() {
        ErrorKind::Transport("request timeout".to_string())
    } else if e.is_connect() {
        ErrorKind::Transport(format!("connection failed: {}", e))
    } else {
        ErrorKind::Transport(e.to_string())
    }
}
