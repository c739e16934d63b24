//! Markup fixtures shared by the crawler unit tests

pub(crate) const PRIMARY_PRICE: &str =
    r#"<div class="x-price-primary"><span class="ux-textspans">US $40.00</span></div>"#;

pub(crate) const BOLD_SHIPPING: &str =
    r#"<span class="ux-textspans ux-textspans--BOLD">US $12.99</span>"#;

/// A listing page in the marketplace layout with the given price and shipping markup
pub(crate) fn listing_html(price_block: &str, shipping_block: &str) -> String {
    format!(
        r#"<html><head><title>Nike Air Force 1 | eBay</title></head><body>
        <h1 class="x-item-title__mainTitle">
            <span class="ux-textspans ux-textspans--BOLD">Nike Air Force 1 '07
                White</span>
        </h1>
        <div class="ux-image-carousel-item image-treatment image">
            <img data-zoom-src="https://i.ebayimg.com/images/g/other/s-l1600.jpg">
        </div>
        <div class="ux-image-carousel-item image-treatment active image">
            <img src="thumb.jpg" data-zoom-src="https://i.ebayimg.com/images/g/abc/s-l1600.jpg">
        </div>
        <div class="x-sellercard-atf__info__about-seller">
            <span class="ux-textspans ux-textspans--BOLD">sneakerhub</span>
        </div>
        <div data-testid="x-price-section">{}</div>
        <div class="ux-layout-section ux-layout-section--shipping">
            <div class="ux-labels-values__values-content">{}</div>
        </div>
        </body></html>"#,
        price_block, shipping_block
    )
}

/// A search-results page whose result container holds the given hrefs
pub(crate) fn search_html(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li class="s-item"><a class="s-item__link" href="{}">listing</a></li>"#,
                href
            )
        })
        .collect();

    format!(
        r#"<html><head><title>nike air force 1 | eBay</title></head><body>
        <a class="s-item__link" href="https://www.ebay.com/itm/outside-results">ad</a>
        <ul id="srp-river-results">{}</ul>
        </body></html>"#,
        items
    )
}
