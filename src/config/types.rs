use serde::Deserialize;

/// Main configuration structure for Listing-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Batch fetching behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of listing pages fetched and parsed at the same time
    #[serde(rename = "max-concurrent-pages-open", default = "default_concurrency")]
    pub max_concurrent_pages_open: u32,

    /// Upper bound on a single page request, in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on establishing a connection, in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Abort the whole run (and write nothing) if any listing fails
    #[serde(rename = "fail-on-error", default)]
    pub fail_on_error: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages_open: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            fail_on_error: false,
        }
    }
}

fn default_concurrency() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the harvester
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for harvester-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Search-results page configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// The search-results page listing links are discovered from
    pub url: String,

    /// Page title the marketplace serves when it rejects a request
    #[serde(rename = "blocked-title", default = "default_blocked_title")]
    pub blocked_title: String,
}

fn default_blocked_title() -> String {
    "access denied".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON file the product records are written to
    #[serde(rename = "json-path")]
    pub json_path: String,
}

/// CSS selectors describing the marketplace page layout
///
/// Every key is optional in the config file; missing keys fall back to the
/// current eBay markup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Container of the search results on the search page
    #[serde(rename = "results-container")]
    pub results_container: String,

    /// Listing anchors inside the results container
    #[serde(rename = "result-link")]
    pub result_link: String,

    /// Bold span inside the listing title block
    #[serde(rename = "product-name")]
    pub product_name: String,

    /// Bold span inside the seller card
    #[serde(rename = "seller-name")]
    pub seller_name: String,

    /// Image element of the active carousel item
    #[serde(rename = "image")]
    pub image: String,

    /// Attribute of the image element holding the full-size link
    #[serde(rename = "image-attribute")]
    pub image_attribute: String,

    /// Wrapper of every price element
    #[serde(rename = "price-section")]
    pub price_section: String,

    /// Approximate (converted) price block, relative to the price section.
    /// Its presence alone selects the converted price.
    #[serde(rename = "price-approx")]
    pub price_approx: String,

    /// Dollar span inside the approximate price block
    #[serde(rename = "price-approx-amount")]
    pub price_approx_amount: String,

    /// Span of the primary price, relative to the price section
    #[serde(rename = "price-primary")]
    pub price_primary: String,

    /// Value container of the shipping section
    #[serde(rename = "shipping-container")]
    pub shipping_container: String,

    /// Secondary bold span holding a converted shipping cost
    #[serde(rename = "shipping-secondary")]
    pub shipping_secondary: String,

    /// Negative-emphasis span the marketplace uses for "no shipping"
    #[serde(rename = "shipping-negative")]
    pub shipping_negative: String,

    /// Plain bold span holding a dollar shipping cost
    #[serde(rename = "shipping-bold")]
    pub shipping_bold: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            results_container: "#srp-river-results".to_string(),
            result_link: "a.s-item__link".to_string(),
            product_name: ".x-item-title__mainTitle span.ux-textspans--BOLD".to_string(),
            seller_name: "div.x-sellercard-atf__info__about-seller span.ux-textspans--BOLD"
                .to_string(),
            image: "div.ux-image-carousel-item.image-treatment.active.image img".to_string(),
            image_attribute: "data-zoom-src".to_string(),
            price_section: r#"div[data-testid="x-price-section"]"#.to_string(),
            price_approx: "div.x-price-approx".to_string(),
            price_approx_amount: "span.x-price-approx__price span".to_string(),
            price_primary: "div.x-price-primary span".to_string(),
            shipping_container:
                "div.ux-layout-section--shipping div.ux-labels-values__values-content".to_string(),
            shipping_secondary: "span.ux-textspans--SECONDARY.ux-textspans--BOLD".to_string(),
            shipping_negative: "span.ux-textspans--BOLD.ux-textspans--NEGATIVE".to_string(),
            shipping_bold: "span.ux-textspans--BOLD".to_string(),
        }
    }
}
