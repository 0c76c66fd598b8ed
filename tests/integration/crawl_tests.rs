//! Integration tests for the crawler
//!
//! These tests run the coordinator with its worker pool against wiremock
//! servers and in-memory sites, then query the resulting index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_index::config::{CrawlerConfig, UserAgentConfig};
use sumi_index::crawler::{
    spawn_coordinator, CoordinatorHandle, FetchedPage, HttpPageSource, PageSource,
};
use sumi_index::output::CrawlStatistics;
use sumi_index::{CrawlPhase, FetchError, IndexError, QueryReply, QueryResult, QueryTerms};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler configuration with the given budget and pool size
fn create_test_config(max_pages: usize, workers: usize) -> CrawlerConfig {
    CrawlerConfig {
        max_pages,
        workers,
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    }
}

fn http_source(config: &CrawlerConfig) -> Arc<dyn PageSource> {
    Arc::new(HttpPageSource::new(&UserAgentConfig::default(), config).expect("Failed to build client"))
}

fn html_page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Polls the coordinator until no fetch is in flight
async fn wait_until_settled(handle: &CoordinatorHandle) -> CrawlStatistics {
    for _ in 0..500 {
        let stats = handle.statistics().await.expect("Coordinator stopped early");
        if stats.is_settled() {
            return stats;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Crawl did not settle");
}

async fn ask(handle: &CoordinatorHandle, input: &str) -> QueryResult {
    match handle.query(QueryTerms::from_input(input)).await {
        Ok(QueryReply::Answer(result)) => result,
        other => panic!("Expected an answer for {:?}, got {:?}", input, other),
    }
}

/// In-memory site keyed by URL; unknown URLs fail with 404
struct StaticSite {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StaticSite {
    fn new(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        })
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for StaticSite {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .map(|body| FetchedPage::new(url.clone(), body.as_str()))
            .ok_or(FetchError::Status(404))
    }
}

#[tokio::test]
async fn test_full_crawl_and_query() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">first</a>
            <a href="/page2">second</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_page(
            r#"<html><body><p>Cat and dog</p><a href="/">home</a></body></html>"#.to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_page(
            r#"<html><body><p>A lonely cat</p><a href="/page1">again</a></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(10, 2);
    let (handle, task) = spawn_coordinator(&config, http_source(&config));

    let accepted = handle
        .start_indexing(vec![format!("{}/", base_url)])
        .await
        .expect("Failed to start");
    assert_eq!(accepted, 1);

    let stats = wait_until_settled(&handle).await;
    assert_eq!(stats.visited, 3);
    assert_eq!(stats.indexed, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.frontier, 0);

    let cat = ask(&handle, "cat").await;
    assert_eq!(cat.total_indexed_pages, 3);
    assert!((cat.fraction_matching - 2.0 / 3.0).abs() < 1e-9);

    let both = ask(&handle, "DOG cat").await;
    assert!((both.fraction_matching - 1.0 / 3.0).abs() < 1e-9);

    assert_eq!(ask(&handle, "fish").await, QueryResult::new(0.0, 3));

    handle.terminate().await.expect("Failed to terminate");
    let final_stats = task.await.expect("Coordinator panicked");
    assert_eq!(final_stats.phase, CrawlPhase::Terminated);
}

#[tokio::test]
async fn test_budget_of_one_fetches_one_seed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/u1"))
        .respond_with(html_page("first seed".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The second seed must never be requested
    Mock::given(method("GET"))
        .and(path("/u2"))
        .respond_with(html_page("second seed".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(1, 2);
    let (handle, _task) = spawn_coordinator(&config, http_source(&config));

    handle
        .start_indexing(vec![format!("{}/u1", base_url), format!("{}/u2", base_url)])
        .await
        .expect("Failed to start");

    let stats = wait_until_settled(&handle).await;
    assert_eq!(stats.visited, 1);
    assert!(stats.budget_exhausted());
    assert_eq!(stats.frontier, 1);
    assert_eq!(stats.idle_workers, 2);
}

#[tokio::test]
async fn test_failed_fetches_count_but_are_not_indexed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<body>start
            <a href="/missing">broken</a>
            <a href="/document.pdf">pdf</a>
            <a href="/next">next</a>
            </body>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html_page(
            r#"<body>more <a href="/missing">broken again</a></body>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    // Linked twice, fetched once
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/document.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x25, 0x50, 0x44, 0x46])
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(10, 1);
    let (handle, _task) = spawn_coordinator(&config, http_source(&config));

    handle
        .start_indexing(vec![format!("{}/", base_url)])
        .await
        .expect("Failed to start");

    let stats = wait_until_settled(&handle).await;
    assert_eq!(stats.visited, 4);
    assert_eq!(stats.indexed, 2);
    assert_eq!(stats.failed, 2);

    assert_eq!(ask(&handle, "start").await, QueryResult::new(0.5, 2));
}

#[tokio::test]
async fn test_relative_links_follow_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/docs/", base_url).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_page(r#"<body>index <a href="intro">intro</a></body>"#.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html_page("<body>getting started</body>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Resolving against the requested URL would land here
    Mock::given(method("GET"))
        .and(path("/intro"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(10, 1);
    let (handle, _task) = spawn_coordinator(&config, http_source(&config));

    handle
        .start_indexing(vec![format!("{}/docs", base_url)])
        .await
        .expect("Failed to start");

    let stats = wait_until_settled(&handle).await;
    assert_eq!(stats.visited, 2);
    assert_eq!(stats.indexed, 2);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_single_worker_is_kept_busy_until_frontier_drains() {
    let site = StaticSite::new(&[
        ("https://site.test/", r#"<a href="/a">a</a><a href="/b">b</a>"#),
        ("https://site.test/a", r#"<a href="/c">c</a> alpha"#),
        ("https://site.test/b", "beta"),
        ("https://site.test/c", r#"<a href="/">back home</a> gamma"#),
    ]);

    let config = create_test_config(100, 1);
    let (handle, _task) = spawn_coordinator(&config, site.clone());

    handle
        .start_indexing(vec!["https://site.test/".to_string()])
        .await
        .expect("Failed to start");

    let stats = wait_until_settled(&handle).await;
    assert_eq!(stats.indexed, 4);
    assert_eq!(stats.idle_workers, 1);

    // FIFO frontier with one worker gives a deterministic order
    assert_eq!(
        site.fetched(),
        vec![
            "https://site.test/",
            "https://site.test/a",
            "https://site.test/b",
            "https://site.test/c",
        ]
    );
}

#[tokio::test]
async fn test_budget_holds_with_many_workers() {
    let mut pages: Vec<(String, String)> = Vec::new();
    for i in 0..30 {
        let links: String = (0..30)
            .map(|j| format!(r#"<a href="/p{}">p{}</a>"#, j, j))
            .collect();
        pages.push((format!("https://wide.test/p{}", i), format!("page {} {}", i, links)));
    }
    let borrowed: Vec<(&str, &str)> = pages
        .iter()
        .map(|(u, b)| (u.as_str(), b.as_str()))
        .collect();
    let site = StaticSite::new(&borrowed);

    let config = create_test_config(7, 8);
    let (handle, _task) = spawn_coordinator(&config, site.clone());

    handle
        .start_indexing(vec!["https://wide.test/p0".to_string()])
        .await
        .expect("Failed to start");

    let stats = wait_until_settled(&handle).await;
    assert_eq!(stats.visited, 7);
    assert_eq!(site.fetched().len(), 7);
}

#[tokio::test]
async fn test_query_before_any_page_is_indexed() {
    let site = StaticSite::new(&[]);
    let config = create_test_config(5, 1);
    let (handle, _task) = spawn_coordinator(&config, site);

    assert_eq!(ask(&handle, "anything").await, QueryResult::new(0.0, 0));
}

#[tokio::test]
async fn test_second_start_is_rejected() {
    let site = StaticSite::new(&[("https://one.test/", "only page")]);
    let config = create_test_config(5, 1);
    let (handle, _task) = spawn_coordinator(&config, site.clone());

    handle
        .start_indexing(vec!["https://one.test/".to_string()])
        .await
        .expect("Failed to start");

    let second = handle
        .start_indexing(vec!["https://two.test/".to_string()])
        .await;
    assert!(matches!(second, Err(IndexError::AlreadyStarted)));

    wait_until_settled(&handle).await;
    assert_eq!(site.fetched(), vec!["https://one.test/"]);
}

#[tokio::test]
async fn test_empty_query_stops_coordinator() {
    let site = StaticSite::new(&[("https://one.test/", "only page")]);
    let config = create_test_config(5, 1);
    let (handle, task) = spawn_coordinator(&config, site);

    let reply = handle.query(QueryTerms::terminate()).await.expect("No reply");
    assert_eq!(reply, QueryReply::Terminated);

    let stats = task.await.expect("Coordinator panicked");
    assert_eq!(stats.phase, CrawlPhase::Terminated);
    assert_eq!(stats.visited, 0);

    let after = handle.query(QueryTerms::from_input("page")).await;
    assert!(matches!(after, Err(IndexError::CoordinatorGone)));
}
