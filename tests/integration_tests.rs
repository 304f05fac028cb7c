//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → paged HTTP requests → JSON file

use percipio_catalog::cli::Runner;
use percipio_catalog::config::AppConfig;
use percipio_catalog::logging::MemoryLogger;
use percipio_catalog::{ErrorKind, LogLevel};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG_PATH: &str = "/content-discovery/v2/organizations/org-1/catalog-content";

fn config(server: &MockServer, out: &Path, page_size: u64) -> AppConfig {
    let yaml = format!(
        r"
request:
  bearer: test-token
  baseURL: {base}
  path:
    orgId: org-1
  query:
    max: {page_size}
    transformName: null
    updatedSince: null
    offset: null
    pagingRequestId: null
  timeout: 1000
retry_options:
  retries: 2
  minTimeout: 1
  maxTimeout: 5
output:
  path: {out}
  filename: catalog.json
",
        base = server.uri(),
        out = out.display(),
    );
    let config = AppConfig::from_yaml(&yaml).unwrap();
    config.validate().unwrap();
    config
}

async fn mount_page(server: &MockServer, offset: u64, total: u64, body: Value) {
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", total.to_string())
                .insert_header("x-paging-request-id", "paging-42")
                .set_body_json(body),
        )
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Full export
// ============================================================================

#[tokio::test]
async fn test_export_all_pages_to_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, 0, 5, json!([{"id": 1}, {"id": 2}])).await;
    mount_page(&server, 2, 5, json!([{"id": 3}, {"id": 4}])).await;
    mount_page(&server, 4, 5, json!([{"id": 5}])).await;

    let logger = Arc::new(MemoryLogger::new());
    let config = config(&server, dir.path(), 2);
    let summary = Runner::export(&config, logger.clone()).await.unwrap();

    assert_eq!(summary.records, 5);
    assert_eq!(summary.total_count, 5);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.path, dir.path().join("catalog.json"));

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&summary.path).unwrap()).unwrap();
    assert_eq!(
        written,
        json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}, {"id": 5}])
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    let later = requests[1].url.query().unwrap_or_default();
    assert!(later.contains("pagingRequestId=paging-42"));
    assert!(later.contains("max=2"));
    assert!(!requests[0]
        .url
        .query()
        .unwrap_or_default()
        .contains("transformName"));

    assert!(logger.contains(LogLevel::Info, "Response saved to"));
}

#[tokio::test]
async fn test_export_empty_catalog() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, 0, 0, json!([])).await;

    let logger = Arc::new(MemoryLogger::new());
    let summary = Runner::export(&config(&server, dir.path(), 1000), logger)
        .await
        .unwrap();

    assert_eq!(summary.records, 0);
    assert_eq!(std::fs::read_to_string(&summary.path).unwrap(), "[]");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Failure modes: nothing is written
// ============================================================================

#[tokio::test]
async fn test_export_missing_total_header() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let logger = Arc::new(MemoryLogger::new());
    let err = Runner::export(&config(&server, dir.path(), 1), logger)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(!dir.path().join("catalog.json").exists());
}

#[tokio::test]
async fn test_export_mid_loop_failure_writes_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, 0, 4, json!([{"id": 1}, {"id": 2}])).await;
    Mock::given(method("GET"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let logger = Arc::new(MemoryLogger::new());
    let err = Runner::export(&config(&server, dir.path(), 2), logger.clone())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PageFetchFailed);
    // First page, then retries + 1 attempts at offset 2
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
    assert!(!dir.path().join("catalog.json").exists());
    assert_eq!(logger.count(LogLevel::Warn), 3);
}

#[tokio::test]
async fn test_export_unauthorized_first_page() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let logger = Arc::new(MemoryLogger::new());
    let err = Runner::export(&config(&server, dir.path(), 2), logger)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert!(err.to_string().contains("HTTP 401"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
