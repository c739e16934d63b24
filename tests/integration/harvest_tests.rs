//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the marketplace and run the full
//! discover, fetch, extract and write cycle end-to-end.

use listing_scout::config::{
    Config, HarvestConfig, OutputConfig, SearchConfig, SelectorConfig, UserAgentConfig,
};
use listing_scout::crawler::harvest;
use listing_scout::{ErrorKind, ProductRecord, ScoutError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given search page and output file
fn create_test_config(search_url: &str, json_path: &Path, fail_on_error: bool) -> Config {
    Config {
        harvest: HarvestConfig {
            max_concurrent_pages_open: 2,
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            fail_on_error,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestScout".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        search: SearchConfig {
            url: search_url.to_string(),
            blocked_title: "access denied".to_string(),
        },
        output: OutputConfig {
            json_path: json_path.display().to_string(),
        },
        selectors: SelectorConfig::default(),
    }
}

fn search_page(links: &[String]) -> String {
    let items: String = links
        .iter()
        .map(|link| format!(r#"<li><a class="s-item__link" href="{}">item</a></li>"#, link))
        .collect();
    format!(
        r#"<html><head><title>shoes | eBay</title></head>
        <body><ul id="srp-river-results">{}</ul></body></html>"#,
        items
    )
}

fn listing_page(name: &str, price_block: &str, shipping_block: &str) -> String {
    format!(
        r#"<html><head><title>{name} | eBay</title></head><body>
        <h1 class="x-item-title__mainTitle"><span class="ux-textspans ux-textspans--BOLD">{name}</span></h1>
        <div class="ux-image-carousel-item image-treatment active image">
            <img data-zoom-src="https://i.ebayimg.com/images/g/{name}/s-l1600.jpg">
        </div>
        <div class="x-sellercard-atf__info__about-seller">
            <span class="ux-textspans ux-textspans--BOLD">shoe_store_99</span>
        </div>
        <div data-testid="x-price-section">{price_block}</div>
        <div class="ux-layout-section--shipping">
            <div class="ux-labels-values__values-content">{shipping_block}</div>
        </div>
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn read_records(json_path: &Path) -> Vec<ProductRecord> {
    let content = std::fs::read_to_string(json_path).expect("output file should exist");
    serde_json::from_str(&content).expect("output should be a JSON array of records")
}

#[tokio::test]
async fn test_full_harvest_with_partial_failure() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("products.json");

    let links = vec![
        format!("{}/itm/1?hash=item1", base_url),
        format!("{}/itm/2", base_url),
        format!("{}/itm/3", base_url),
    ];
    mount_page(&server, "/sch/i.html", 200, search_page(&links)).await;
    mount_page(
        &server,
        "/itm/1",
        200,
        listing_page(
            "sneaker-one",
            r#"<div class="x-price-approx"><span class="x-price-approx__price"><span>US $1,045.30</span></span></div>
               <div class="x-price-primary"><span>GBP 820.00</span></div>"#,
            r#"<span class="ux-textspans--SECONDARY ux-textspans--BOLD">(approx. US $12.50)</span>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/itm/2",
        200,
        listing_page(
            "sneaker-two",
            r#"<div class="x-price-primary"><span>US $40.00</span></div>"#,
            r#"<span class="ux-textspans--BOLD ux-textspans--NEGATIVE">Does not ship to United States</span>"#,
        ),
    )
    .await;
    mount_page(&server, "/itm/3", 404, "gone".to_string()).await;

    let search_url = format!("{}/sch/i.html?_nkw=shoes", base_url);
    let config = create_test_config(&search_url, &json_path, false);
    let report = harvest(&config).await.expect("harvest should succeed");

    let records = read_records(&json_path);
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].product_name, "sneaker-one");
    assert_eq!(records[0].seller_name, "shoe_store_99");
    assert_eq!(records[0].price_dollars, 1045.3);
    assert_eq!(records[0].shipping_cost_dollars, Some(12.5));
    assert_eq!(records[0].product_link, format!("{}/itm/1", base_url));

    assert_eq!(records[1].price_dollars, 40.0);
    assert_eq!(records[1].shipping_cost_dollars, None);

    assert_eq!(report.outcome.failures.len(), 1);
    assert_eq!(report.outcome.failures[0].url, format!("{}/itm/3", base_url));
    assert_eq!(report.outcome.failures[0].kind, ErrorKind::HttpStatus(404));
    assert_eq!(report.statistics.total_urls, 3);
    assert_eq!(report.statistics.parsed, 2);
}

#[tokio::test]
async fn test_blocked_search_page_is_fatal() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("products.json");

    mount_page(
        &server,
        "/sch/i.html",
        200,
        "<html><head><title>Access Denied</title></head><body>Reference #18</body></html>"
            .to_string(),
    )
    .await;

    let config = create_test_config(&format!("{}/sch/i.html", server.uri()), &json_path, false);
    let result = harvest(&config).await;

    assert!(matches!(result, Err(ScoutError::Blocked { .. })));
    assert!(!json_path.exists());
}

#[tokio::test]
async fn test_empty_search_results_write_empty_array() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("out/products.json");

    mount_page(&server, "/sch/i.html", 200, search_page(&[])).await;

    let config = create_test_config(&format!("{}/sch/i.html", server.uri()), &json_path, false);
    let report = harvest(&config).await.unwrap();

    assert_eq!(std::fs::read_to_string(&json_path).unwrap(), "[]");
    assert_eq!(report.statistics.total_urls, 0);
}

#[tokio::test]
async fn test_fail_on_error_aborts_without_output() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("products.json");

    let links = vec![format!("{}/itm/1", base_url), format!("{}/itm/2", base_url)];
    mount_page(&server, "/sch/i.html", 200, search_page(&links)).await;
    mount_page(
        &server,
        "/itm/1",
        200,
        listing_page(
            "sneaker-one",
            r#"<div class="x-price-primary"><span>US $40.00</span></div>"#,
            r#"<span class="ux-textspans--BOLD">US $5.00</span>"#,
        ),
    )
    .await;
    mount_page(&server, "/itm/2", 503, "busy".to_string()).await;

    let config = create_test_config(&format!("{}/sch/i.html", base_url), &json_path, true);
    let result = harvest(&config).await;

    assert!(matches!(
        result,
        Err(ScoutError::BatchFailed { failed: 1, total: 2 })
    ));
    assert!(!json_path.exists());
}

#[tokio::test]
async fn test_search_page_error_status() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("products.json");

    mount_page(&server, "/sch/i.html", 500, "oops".to_string()).await;

    let config = create_test_config(&format!("{}/sch/i.html", server.uri()), &json_path, false);
    let result = harvest(&config).await;

    match result {
        Err(ScoutError::Discovery { kind, .. }) => assert_eq!(kind, ErrorKind::HttpStatus(500)),
        other => panic!("expected discovery failure, got {:?}", other.map(|r| r.outcome)),
    }
}
