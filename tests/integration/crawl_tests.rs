//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing pages and a temporary SQLite
//! database to run the full seed, page, drain and close cycle end-to-end.

use jobs_harvest::config::{Config, DatabaseConfig};
use jobs_harvest::crawler::{crawl, listing_url, CrawlMode};
use jobs_harvest::storage::{JobRecord, JobStore, SqliteJobStore};
use jobs_harvest::TerminationReason;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server and a temp database
fn create_test_config(base_url: &str, db_path: &Path, mode: CrawlMode) -> Config {
    let mut config = Config::default();

    config.site.base_url = base_url.to_string();
    config.crawler.mode = mode;
    config.crawler.page_bound = 3;
    config.crawler.max_concurrent_pages = 2;
    config.crawler.page_delay_ms = 0; // No pause between pages in tests
    config.fetcher.navigation_timeout_secs = 5;
    config.database = DatabaseConfig {
        path: db_path.to_string_lossy().into_owned(),
        ..DatabaseConfig::default()
    };

    config
}

/// Renders a listing page with one row per job id
fn listing_page(ids: &[u32]) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr>
                    <td><img src="/logo.png"></td>
                    <td><a href="/en/?view=jobs&id={id}">Vacancy {id}</a></td>
                    <td></td>
                    <td>Company {id}</td>
                    <td>01 June</td>
                    <td>30 June</td>
                </tr>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <table id="temp_table">
            <tr><td>Vacancy</td><td>Company</td></tr>
            {}
        </table>
        </body></html>"#,
        rows
    )
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/en/"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn job_url(base_url: &str, id: u32) -> String {
    format!("{}/en/?view=jobs&id={}", base_url, id)
}

async fn stored_jobs(db_path: &Path) -> u64 {
    SqliteJobStore::new(db_path)
        .expect("Failed to reopen database")
        .count_jobs()
        .await
        .expect("Failed to count jobs")
}

#[tokio::test]
async fn test_sequential_crawl_skips_stored_and_stops_on_loop() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Page 2 repeats page 1 exactly; page 3 must never be requested
    mount_page(&mock_server, 1, listing_page(&[1, 2, 3])).await;
    mount_page(&mock_server, 2, listing_page(&[1, 2, 3])).await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[9])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");

    // One of the three vacancies is already stored
    {
        let store = SqliteJobStore::new(&db_path).unwrap();
        store
            .insert(&JobRecord {
                vacancy_name: "Vacancy 2".to_string(),
                company_name: "Company 2".to_string(),
                published: "01 June".to_string(),
                deadline: "30 June".to_string(),
                job_url: job_url(&base_url, 2),
            })
            .await
            .unwrap();
    }

    let config = create_test_config(&base_url, &db_path, CrawlMode::Sequential);
    let report = crawl(&config).await.expect("Crawl failed to start");

    assert_eq!(report.termination, Some(TerminationReason::LoopDetected));
    assert_eq!(report.tally.pages_fetched, 2);
    assert_eq!(report.tally.inserted, 2);
    assert_eq!(report.tally.duplicates_skipped, 1);
    assert_eq!(report.known_urls, 3);
    assert_eq!(stored_jobs(&db_path).await, 3);
}

#[tokio::test]
async fn test_second_run_inserts_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, 1, listing_page(&[10, 11])).await;
    mount_page(&mock_server, 2, listing_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");
    let config = create_test_config(&base_url, &db_path, CrawlMode::Sequential);

    let first = crawl(&config).await.unwrap();
    assert_eq!(first.termination, Some(TerminationReason::EmptyPage));
    assert_eq!(first.tally.inserted, 2);

    let second = crawl(&config).await.unwrap();
    assert_eq!(second.termination, Some(TerminationReason::EmptyPage));
    assert_eq!(second.tally.inserted, 0);
    assert_eq!(second.tally.duplicates_skipped, 2);

    assert_eq!(stored_jobs(&db_path).await, 2);
}

#[tokio::test]
async fn test_first_page_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");
    let config = create_test_config(&mock_server.uri(), &db_path, CrawlMode::Sequential);

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.termination, Some(TerminationReason::FetchFailed));
    assert_eq!(report.tally.pages_failed, 1);
    assert_eq!(stored_jobs(&db_path).await, 0);
}

#[tokio::test]
async fn test_missing_listing_table_ends_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        "<html><body><p>Maintenance</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");
    let config = create_test_config(&mock_server.uri(), &db_path, CrawlMode::Sequential);

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.termination, Some(TerminationReason::EmptyPage));
    assert_eq!(report.tally.pages_fetched, 1);
    assert_eq!(report.tally.records_extracted, 0);
}

#[tokio::test]
async fn test_redirect_back_to_first_page_is_repeat() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Out-of-range page bounces back to page 1
    mount_page(&mock_server, 1, listing_page(&[20])).await;
    Mock::given(method("GET"))
        .and(path("/en/"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", listing_url(&base_url, 1).as_str()),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");
    let config = create_test_config(&base_url, &db_path, CrawlMode::Sequential);

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.termination, Some(TerminationReason::RepeatedPage));
    assert_eq!(report.tally.inserted, 1);
    assert_eq!(stored_jobs(&db_path).await, 1);
}

#[tokio::test]
async fn test_concurrent_crawl_stores_shared_job_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, 1, listing_page(&[30, 31])).await;
    mount_page(&mock_server, 2, listing_page(&[31, 32])).await;
    mount_page(&mock_server, 3, listing_page(&[32, 30, 33])).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");
    let config = create_test_config(&base_url, &db_path, CrawlMode::Concurrent);

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.mode, CrawlMode::Concurrent);
    assert_eq!(report.termination, None);
    assert_eq!(report.tally.pages_fetched, 3);
    assert_eq!(report.tally.records_extracted, 7);
    assert_eq!(report.tally.inserted, 4);
    assert_eq!(report.tally.duplicates_skipped, 3);
    assert_eq!(stored_jobs(&db_path).await, 4);

    let store = SqliteJobStore::new(&db_path).unwrap();
    let mut urls = store.list_existing_urls().await.unwrap();
    urls.sort();
    let mut expected: Vec<String> = [30, 31, 32, 33]
        .iter()
        .map(|id| job_url(&base_url, *id))
        .collect();
    expected.sort();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn test_concurrent_crawl_survives_failed_page() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 1, listing_page(&[40])).await;
    mount_page(&mock_server, 3, listing_page(&[41])).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");
    let config = create_test_config(&mock_server.uri(), &db_path, CrawlMode::Concurrent);

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.tally.pages_failed, 1);
    assert_eq!(report.tally.inserted, 2);
    assert_eq!(stored_jobs(&db_path).await, 2);
}
