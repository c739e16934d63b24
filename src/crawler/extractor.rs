//! Listing page field extraction
//!
//! Turns a parsed listing page into a [`ProductRecord`]. Name, seller and
//! image each come from a single anchor. Price and shipping cost are rendered
//! in several mutually exclusive layouts depending on currency conversion and
//! shipping availability, and more than one of those elements can be present
//! at once, so they are resolved through ordered rule tables
//! ([`PRICE_RULES`], [`SHIPPING_RULES`]) where the first matching rule wins.
//!
//! # Price rules
//!
//! | Order | Rule | Element | Result |
//! |-------|------|---------|--------|
//! | 1 | `ConvertedApprox` | approximate-price block | dollar amount of its nested span |
//! | 2 | `Primary` | primary price span | dollar amount |
//! | - | none matched | | `PriceNotFound` |
//!
//! Once the approximate block is present the converted branch is final: a
//! block without its dollar span is `MissingField`, never the primary price.
//!
//! # Shipping rules
//!
//! | Order | Rule | Element | Result |
//! |-------|------|---------|--------|
//! | 1 | `ConvertedSecondary` | secondary bold span | dollar amount, `)` stripped |
//! | 2 | `NoShipping` | negative-emphasis bold span | `None` |
//! | 3 | `PlainBold` | bold span | dollar amount |
//! | - | none matched | | `ShippingNotFound` |

use crate::config::{Config, SelectorConfig};
use crate::crawler::record::ProductRecord;
use crate::{ConfigError, ErrorKind};
use scraper::{ElementRef, Html, Selector};

/// Compiled CSS selectors for search and listing pages
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub(crate) title: Selector,
    pub(crate) results_container: Selector,
    pub(crate) result_link: Selector,
    pub(crate) product_name: Selector,
    pub(crate) seller_name: Selector,
    pub(crate) image: Selector,
    pub(crate) image_attribute: String,
    pub(crate) price_section: Selector,
    pub(crate) price_approx: Selector,
    pub(crate) price_approx_amount: Selector,
    pub(crate) price_primary: Selector,
    pub(crate) shipping_container: Selector,
    pub(crate) shipping_secondary: Selector,
    pub(crate) shipping_negative: Selector,
    pub(crate) shipping_bold: Selector,
}

impl PageSelectors {
    /// Compiles every selector of the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PageSelectors)` - All selectors are valid CSS
    /// * `Err(ConfigError::InvalidSelector)` - Names the first selector that failed
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile_selector("title", "title")?,
            results_container: compile_selector("results-container", &config.results_container)?,
            result_link: compile_selector("result-link", &config.result_link)?,
            product_name: compile_selector("product-name", &config.product_name)?,
            seller_name: compile_selector("seller-name", &config.seller_name)?,
            image: compile_selector("image", &config.image)?,
            image_attribute: config.image_attribute.clone(),
            price_section: compile_selector("price-section", &config.price_section)?,
            price_approx: compile_selector("price-approx", &config.price_approx)?,
            price_approx_amount: compile_selector(
                "price-approx-amount",
                &config.price_approx_amount,
            )?,
            price_primary: compile_selector("price-primary", &config.price_primary)?,
            shipping_container: compile_selector(
                "shipping-container",
                &config.shipping_container,
            )?,
            shipping_secondary: compile_selector(
                "shipping-secondary",
                &config.shipping_secondary,
            )?,
            shipping_negative: compile_selector("shipping-negative", &config.shipping_negative)?,
            shipping_bold: compile_selector("shipping-bold", &config.shipping_bold)?,
        })
    }
}

fn compile_selector(name: &'static str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|_| ConfigError::InvalidSelector {
        name,
        selector: css.to_string(),
    })
}

/// Where a listing's dollar price can appear, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRule {
    /// Approximate dollar price shown when the listing is priced in another currency
    ConvertedApprox,
    /// The listing's own price
    Primary,
}

pub const PRICE_RULES: [PriceRule; 2] = [PriceRule::ConvertedApprox, PriceRule::Primary];

impl PriceRule {
    fn locate<'a>(
        self,
        section: ElementRef<'a>,
        selectors: &PageSelectors,
    ) -> Option<ElementRef<'a>> {
        let selector = match self {
            Self::ConvertedApprox => &selectors.price_approx,
            Self::Primary => &selectors.price_primary,
        };
        section.select(selector).next()
    }

    /// Returns the element holding the dollar text of a located anchor
    fn amount<'a>(
        self,
        anchor: ElementRef<'a>,
        selectors: &PageSelectors,
    ) -> Result<ElementRef<'a>, ErrorKind> {
        match self {
            Self::ConvertedApprox => anchor
                .select(&selectors.price_approx_amount)
                .next()
                .ok_or(ErrorKind::MissingField("price_dollars")),
            Self::Primary => Ok(anchor),
        }
    }
}

/// Where a listing's shipping cost can appear, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingRule {
    /// Approximate dollar cost, e.g. `(approx US $12.50)`
    ConvertedSecondary,
    /// Marketplace styling for "does not ship" / free
    NoShipping,
    /// Dollar cost in a plain bold span
    PlainBold,
}

pub const SHIPPING_RULES: [ShippingRule; 3] = [
    ShippingRule::ConvertedSecondary,
    ShippingRule::NoShipping,
    ShippingRule::PlainBold,
];

impl ShippingRule {
    fn locate<'a>(
        self,
        container: ElementRef<'a>,
        selectors: &PageSelectors,
    ) -> Option<ElementRef<'a>> {
        let selector = match self {
            Self::ConvertedSecondary => &selectors.shipping_secondary,
            Self::NoShipping => &selectors.shipping_negative,
            Self::PlainBold => &selectors.shipping_bold,
        };
        container.select(selector).next()
    }

    fn resolve(self, element: ElementRef<'_>) -> Result<Option<f64>, ErrorKind> {
        match self {
            Self::ConvertedSecondary => {
                let text = element_text(element);
                parse_shipping_amount(text.trim_end_matches(')')).map(Some)
            }
            Self::NoShipping => Ok(None),
            Self::PlainBold => parse_shipping_amount(&element_text(element)).map(Some),
        }
    }
}

/// Fields that come from a single structural anchor each
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub product_name: String,
    pub seller_name: String,
    pub image_link: String,
}

/// Fields resolved through the price and shipping rule tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingFields {
    pub price_dollars: f64,
    pub shipping_cost_dollars: Option<f64>,
}

impl ListingFields {
    /// Combines both extraction phases into the final record
    pub fn into_record(self, pricing: PricingFields, source_url: &str) -> ProductRecord {
        ProductRecord {
            product_name: self.product_name,
            seller_name: self.seller_name,
            image_link: self.image_link,
            price_dollars: pricing.price_dollars,
            shipping_cost_dollars: pricing.shipping_cost_dollars,
            product_link: source_url.to_string(),
        }
    }
}

/// Extracts [`ProductRecord`]s from parsed listing pages
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    selectors: PageSelectors,
    blocked_title: String,
}

impl FieldExtractor {
    /// Creates an extractor from compiled selectors and the soft-block page title
    pub fn new(selectors: PageSelectors, blocked_title: &str) -> Self {
        Self {
            selectors,
            blocked_title: blocked_title.trim().to_lowercase(),
        }
    }

    /// Creates an extractor from the `[selectors]` and `[search]` configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let selectors = PageSelectors::compile(&config.selectors)?;
        Ok(Self::new(selectors, &config.search.blocked_title))
    }

    /// Extracts a complete record from a listing page
    ///
    /// # Arguments
    ///
    /// * `page` - The parsed listing page
    /// * `source_url` - Stored as `product_link`; never read from the page
    pub fn extract(&self, page: &Html, source_url: &str) -> Result<ProductRecord, ErrorKind> {
        let listing = self.extract_listing(page)?;
        let pricing = self.extract_pricing(page)?;
        Ok(listing.into_record(pricing, source_url))
    }

    /// Extracts name, seller and image after checking for a soft block
    pub fn extract_listing(&self, page: &Html) -> Result<ListingFields, ErrorKind> {
        if self.is_blocked(page) {
            return Err(ErrorKind::Blocked);
        }

        let product_name = page
            .select(&self.selectors.product_name)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .ok_or(ErrorKind::MissingField("product_name"))?;

        let seller_name = page
            .select(&self.selectors.seller_name)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .ok_or(ErrorKind::MissingField("seller_name"))?;

        let image_link = page
            .select(&self.selectors.image)
            .next()
            .and_then(|img| img.value().attr(&self.selectors.image_attribute))
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(str::to_string)
            .ok_or(ErrorKind::MissingField("image_link"))?;

        Ok(ListingFields {
            product_name,
            seller_name,
            image_link,
        })
    }

    /// Resolves price and shipping cost through their rule tables
    pub fn extract_pricing(&self, page: &Html) -> Result<PricingFields, ErrorKind> {
        let price_section = page
            .select(&self.selectors.price_section)
            .next()
            .ok_or(ErrorKind::MissingField("price_dollars"))?;
        let price_dollars = self.extract_price(price_section)?;

        let shipping_container = page
            .select(&self.selectors.shipping_container)
            .next()
            .ok_or(ErrorKind::MissingField("shipping_cost_dollars"))?;
        let shipping_cost_dollars = self.extract_shipping(shipping_container)?;

        Ok(PricingFields {
            price_dollars,
            shipping_cost_dollars,
        })
    }

    fn extract_price(&self, section: ElementRef<'_>) -> Result<f64, ErrorKind> {
        let (rule, anchor) = PRICE_RULES
            .iter()
            .find_map(|rule| rule.locate(section, &self.selectors).map(|el| (*rule, el)))
            .ok_or(ErrorKind::PriceNotFound)?;

        let text = element_text(rule.amount(anchor, &self.selectors)?);
        tracing::trace!("Price rule {:?} matched {:?}", rule, text);

        let price = parse_dollar_amount(&text)?;
        if price <= 0.0 {
            return Err(ErrorKind::MalformedNumber(text));
        }
        Ok(price)
    }

    fn extract_shipping(&self, container: ElementRef<'_>) -> Result<Option<f64>, ErrorKind> {
        let (rule, element) = SHIPPING_RULES
            .iter()
            .find_map(|rule| rule.locate(container, &self.selectors).map(|el| (*rule, el)))
            .ok_or(ErrorKind::ShippingNotFound)?;

        tracing::trace!("Shipping rule {:?} matched", rule);
        rule.resolve(element)
    }

    /// Returns true if the page is the marketplace's "access denied" page
    pub fn is_blocked(&self, page: &Html) -> bool {
        is_blocked_page(page, &self.selectors, &self.blocked_title)
    }
}

/// Compares the page title against an already lowercased sentinel
pub(crate) fn is_blocked_page(page: &Html, selectors: &PageSelectors, blocked_title: &str) -> bool {
    page.select(&selectors.title)
        .next()
        .map(|title| element_text(title).to_lowercase() == blocked_title)
        .unwrap_or(false)
}

/// Collects the text of an element with whitespace runs collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses the dollar amount out of text such as `US $1,234.56` or `≈ $45.30`
///
/// The amount is whatever follows the last `$` (or the whole text when there
/// is none). Thousands separators are ignored. Empty, non-numeric and
/// non-finite values are [`ErrorKind::MalformedNumber`].
pub fn parse_dollar_amount(text: &str) -> Result<f64, ErrorKind> {
    let malformed = || ErrorKind::MalformedNumber(text.trim().to_string());
    let amount = text.rsplit('$').next().unwrap_or(text).trim();

    let cleaned = if amount.contains(',') {
        if !has_thousands_grouping(amount) {
            return Err(malformed());
        }
        amount.replace(',', "")
    } else {
        amount.to_string()
    };

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(malformed)
}

/// True for `1,234` or `12,345,678.90`: groups of three digits after a
/// leading group of one to three
fn has_thousands_grouping(amount: &str) -> bool {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    let (integer, fraction) = match amount.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (amount, None),
    };
    if fraction.is_some_and(|fraction| !all_digits(fraction)) {
        return false;
    }

    let mut groups = integer.split(',');
    let leading_ok = groups
        .next()
        .is_some_and(|group| all_digits(group) && group.len() <= 3);
    leading_ok && groups.all(|group| all_digits(group) && group.len() == 3)
}

fn parse_shipping_amount(text: &str) -> Result<f64, ErrorKind> {
    let cost = parse_dollar_amount(text)?;
    if cost < 0.0 {
        return Err(ErrorKind::MalformedNumber(text.trim().to_string()));
    }
    Ok(cost)
}
