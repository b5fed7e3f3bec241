//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for the remote catalog and drive
//! full scrape sessions end-to-end, including the HTTP surface.

use calamine::{open_workbook, Reader, Xlsx};
use product_scraper::config::Config;
use product_scraper::crawler::{ScrapeSession, SessionError};
use product_scraper::output::{EXPORT_HEADERS, EXPORT_MIME_TYPE, SHEET_NAME};
use product_scraper::server::{create_router, AppState};
use product_scraper::state::{CrawlState, Phase, Termination};
use product_scraper::ScrapeError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders one product container with its embedded payload
fn product(name: &str, price: u32) -> String {
    format!(
        r#"<div class="product-wrapper">
            <span class="gtm4wp_productdata" data-gtm4wp_product_data='{{"item_name":"{name}","price":{price},"productlink":"https://shop.example.com/{name}"}}'></span>
            <img class="attachment-shop_catalog" src="https://cdn.example.com/placeholder.gif" data-src="https://cdn.example.com/{name}.jpg">
        </div>"#
    )
}

/// Renders a listing page around the given product containers
fn listing(products: &[String], next: bool) -> String {
    let nav = if next {
        r##"<nav class="woocommerce-pagination"><a class="next page-numbers" href="#">→</a></nav>"##
    } else {
        ""
    };
    format!(
        "<html><head><title>Products</title></head><body>{}{}</body></html>",
        products.join("\n"),
        nav
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Creates a configuration pointing at the mock catalog and a temp export dir
fn create_test_config(server_uri: &str, export_root: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = format!("{}/products", server_uri);
    config.site.timeout_secs = 5;
    config.output.export_dir = export_root.join("data").display().to_string();
    config
}

async fn wait_for(session: &ScrapeSession, done: impl Fn(&CrawlState) -> bool) -> CrawlState {
    for _ in 0..500 {
        let snapshot = session.snapshot();
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached; last state: {:?}", session.snapshot());
}

/// Decoded worksheet cells, header row included
fn read_cells(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("Export file missing");
    let range = workbook
        .worksheet_range(SHEET_NAME)
        .expect("Export worksheet missing");
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Data rows of the configured export, header excluded
fn export_rows(config: &Config) -> Vec<Vec<String>> {
    let export = Path::new(&config.output.export_dir).join(&config.output.export_file);
    let mut cells = read_cells(&export);
    assert_eq!(cells.remove(0), EXPORT_HEADERS.map(String::from).to_vec());
    cells
}

/// Mounts an endless catalog: page 1 immediately, every later page delayed
async fn mount_endless_catalog(mock_server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(&[product("p1a", 10), product("p1b", 20)], true)))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/products/page/\d+$"))
        .respond_with(
            html(listing(&[product("more", 5), product("again", 6)], true)).set_delay(delay),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_two_page_catalog_end_to_end() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(
            &[product("arduino-uno", 450), product("esp32", 300)],
            true,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/page/2"))
        .respond_with(html(listing(&[product("servo-sg90", 75)], false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).expect("Failed to build session");

    session.start().await.expect("Start failed");
    let state = wait_for(&session, |s| s.phase == Phase::Stopped).await;

    assert_eq!(state.total_count, 3);
    assert_eq!(state.pages_processed, 2);
    let names: Vec<_> = state.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["arduino-uno", "esp32", "servo-sg90"]);
    assert_eq!(state.records[0].price_display, "450 EGP");
    assert_eq!(
        state.records[0].image_url,
        "https://cdn.example.com/arduino-uno.jpg"
    );

    let outcome = state.outcome.expect("Outcome missing");
    assert_eq!(outcome.termination, Termination::Exhausted);
    assert!(outcome.export_error.is_none());

    let rows = export_rows(&config);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "arduino-uno");
    assert_eq!(rows[0][1], "450 EGP");
    assert_eq!(rows[2][0], "servo-sg90");
    assert_eq!(
        rows[2][2],
        "[servo-sg90](https://shop.example.com/servo-sg90)"
    );
}

#[tokio::test]
async fn test_malformed_item_is_skipped() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let broken = r#"<div class="product-wrapper">
        <span class="gtm4wp_productdata" data-gtm4wp_product_data='{"item_name": "broken", "price": '></span>
    </div>"#
        .to_string();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(
            &[product("first", 1), broken, product("third", 3)],
            false,
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).unwrap();

    session.start().await.unwrap();
    let state = wait_for(&session, |s| s.phase == Phase::Stopped).await;

    let names: Vec<_> = state.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "third"]);
    assert_eq!(
        state.outcome.map(|o| o.termination),
        Some(Termination::Exhausted)
    );
}

#[tokio::test]
async fn test_transport_failure_exports_partial_results() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(&[product("a", 1), product("b", 2)], true)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/page/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).unwrap();

    session.start().await.unwrap();
    let state = wait_for(&session, |s| s.phase == Phase::Stopped).await;

    assert_eq!(state.total_count, 2);
    let outcome = state.outcome.expect("Outcome missing");
    assert!(matches!(
        outcome.termination,
        Termination::Failed { page: 2, .. }
    ));
    assert_eq!(export_rows(&config).len(), 2);
}

#[tokio::test]
async fn test_stop_joins_running_crawl() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_endless_catalog(&mock_server, Duration::from_millis(100)).await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).unwrap();

    session.start().await.unwrap();
    wait_for(&session, |s| s.total_count >= 2).await;

    // A second start while running is rejected and leaves the run alone
    assert!(matches!(
        session.start().await,
        Err(SessionError::AlreadyRunning)
    ));
    assert_eq!(session.phase(), Phase::Running);
    assert!(session.snapshot().total_count >= 2);

    let stopped = session.stop().await.expect("Stop failed");
    assert_eq!(stopped.report.termination, Termination::Cancelled);
    assert_eq!(session.phase(), Phase::Stopped);

    let after_stop = session.snapshot();
    assert_eq!(after_stop.total_count, stopped.report.total_records);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let later = session.snapshot();
    assert_eq!(later.total_count, after_stop.total_count);
    assert_eq!(later.records, after_stop.records);

    let summary = stopped.report.export.expect("Export failed");
    assert_eq!(summary.rows, after_stop.total_count);
    assert_eq!(export_rows(&config).len(), after_stop.total_count);

    assert!(matches!(session.stop().await, Err(SessionError::NotRunning)));
}

#[tokio::test]
async fn test_snapshots_grow_by_prefix() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_endless_catalog(&mock_server, Duration::from_millis(30)).await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).unwrap();

    session.start().await.unwrap();

    let mut previous = session.snapshot();
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(15)).await;
        let current = session.snapshot();

        assert_eq!(current.total_count, current.records.len());
        assert!(current.records.len() >= previous.records.len());
        assert_eq!(
            &current.records[..previous.records.len()],
            previous.records.as_slice()
        );
        previous = current;
    }

    session.stop().await.unwrap();
    assert!(previous.total_count > 2);
}

#[tokio::test]
async fn test_restart_begins_from_first_page() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(&[product("only", 9)], false)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).unwrap();

    for _ in 0..2 {
        session.start().await.unwrap();
        let state = wait_for(&session, |s| s.phase == Phase::Stopped).await;
        assert_eq!(state.total_count, 1);
    }
}

#[tokio::test]
async fn test_http_controls_and_download() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(&[product("a", 1), product("b", 2)], true)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/page/2"))
        .respond_with(html(listing(&[product("c", 3)], false)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = Arc::new(ScrapeSession::from_config(&config).unwrap());
    let app = create_router(AppState {
        session: Arc::clone(&session),
        poll_interval_ms: config.server.poll_interval_ms,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", address);

    let response = client
        .get(format!("{}/download_excel/", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .post(format!("{}/api/scrape/stop", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    let response = client
        .post(format!("{}/api/scrape/start", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 202);

    wait_for(&session, |s| s.phase == Phase::Stopped).await;

    let progress: serde_json::Value = client
        .get(format!("{}/api/scrape/progress", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["phase"], "stopped");
    assert_eq!(progress["total_count"], 3);
    assert_eq!(progress["label"], "Total Scraped: 3 Items");
    assert_eq!(progress["poll_interval_ms"], 2000);
    assert_eq!(progress["records"].as_array().map(Vec::len), Some(3));

    let response = client
        .get(format!("{}/download_excel/", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some(EXPORT_MIME_TYPE)
    );
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"products_data.xlsx\"")
    );
    let body = response.bytes().await.unwrap();
    let downloaded = temp.path().join("downloaded.xlsx");
    std::fs::write(&downloaded, &body).unwrap();
    let cells = read_cells(&downloaded);
    assert_eq!(cells.len(), 4);
    assert_eq!(cells[0], EXPORT_HEADERS.map(String::from).to_vec());

    let exported: serde_json::Value = client
        .post(format!("{}/api/scrape/export", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exported["rows"], 3);
}

#[tokio::test]
async fn test_failed_export_is_reported_and_retried() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(listing(&[product("a", 1), product("b", 2)], false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // A regular file where the export directory should go
    let blocker = temp.path().join("data");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let config = create_test_config(&mock_server.uri(), temp.path());
    let session = ScrapeSession::from_config(&config).unwrap();

    session.start().await.unwrap();
    let state = wait_for(&session, |s| s.phase == Phase::Stopped).await;

    assert_eq!(state.total_count, 2);
    let outcome = state.outcome.expect("Outcome missing");
    assert_eq!(outcome.termination, Termination::Exhausted);
    assert!(outcome.export_path.is_none());
    assert!(outcome
        .export_error
        .expect("Export error missing")
        .contains("export directory"));

    assert!(matches!(
        session.export().await,
        Err(ScrapeError::Export(_))
    ));

    std::fs::remove_file(&blocker).unwrap();
    let summary = session.export().await.expect("Retry failed");
    assert_eq!(summary.rows, 2);

    let retried = session.snapshot();
    assert_eq!(retried.total_count, 2);
    let outcome = retried.outcome.expect("Outcome missing");
    assert_eq!(
        outcome.export_path.as_deref(),
        Some(summary.path.display().to_string().as_str())
    );
    assert!(outcome.export_error.is_none());

    let names: Vec<_> = export_rows(&config).into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_catalog_query_string_is_kept_across_pages() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("orderby", "price"))
        .respond_with(html(listing(&[product("cheap", 1)], true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/page/2"))
        .and(query_param("orderby", "price"))
        .respond_with(html(listing(&[product("pricier", 2)], false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), temp.path());
    config.site.base_url = format!("{}/products?orderby=price", mock_server.uri());
    let session = ScrapeSession::from_config(&config).unwrap();

    session.start().await.unwrap();
    let state = wait_for(&session, |s| s.phase == Phase::Stopped).await;

    let names: Vec<_> = state.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["cheap", "pricier"]);
    assert_eq!(
        state.outcome.map(|o| o.termination),
        Some(Termination::Exhausted)
    );
}
