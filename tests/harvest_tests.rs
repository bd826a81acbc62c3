//! Integration tests for the harvesting engine
//!
//! These use wiremock to stand in for the auction site and drive the full
//! search cycle end to end: listing walk, keyword filter, detail
//! extraction, progress events, and statistics.

use rakusatsu::config::Config;
use rakusatsu::crawler::Fetcher;
use rakusatsu::engine::run_search;
use rakusatsu::events::{EventSink, ProgressEvent};
use rakusatsu::query::SearchQuery;
use rakusatsu::{EngineError, FetchError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Engine config pointed at the mock server, with test-friendly pacing
fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.listing.base_url = base_url.to_string();
    config.fetch.backoff_base_ms = 5;
    config.pacing.page_delay_ms = 0;
    config.pacing.batch_delay_ms = 0;
    config.collector.batch_size = 2;
    config
}

fn seller_query(keyword: &str, limit: Option<usize>) -> SearchQuery {
    // The engine validates the seller URL against the production host; only
    // the listing base URL points at the mock server.
    SearchQuery {
        seller_url: "https://auctions.yahoo.co.jp/jp/show/rating?auc_user_id=abc&role=seller"
            .to_string(),
        keyword: keyword.to_string(),
        limit,
    }
}

/// Runs a search and drains the full event stream
async fn run_and_collect(
    query: &SearchQuery,
    config: &Config,
) -> (rakusatsu::Result<()>, Vec<ProgressEvent>) {
    let cancel = CancellationToken::new();
    let (sink, mut rx) = EventSink::channel(cancel.clone());

    let result = run_search(query, config, &sink, &cancel).await;
    drop(sink);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (result, events)
}

fn listing_anchor(base_url: &str, id: &str, title: &str) -> String {
    format!(r#"<a href="{}/jp/auction/{}">{}</a>"#, base_url, id, title)
}

fn page_data_detail(title: &str, price: u64, end_time: &str) -> String {
    format!(
        r#"<html><body><script>var pageData = {{"items":{{"productName":"{}","price":"{}","endTime":"{}"}}}};
        var extra = {{"tracking":true}};</script></body></html>"#,
        title, price, end_time
    )
}

async fn mount_listing_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/jp/show/rating"))
        .and(query_param("auc_user_id", "abc"))
        .and(query_param("apg", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/jp/auction/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn server_errors_are_retried_up_to_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let fetcher = Fetcher::new(&config.fetch).unwrap();

    let result = fetcher.fetch_page(&format!("{}/flaky", server.uri())).await;
    assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
}

#[tokio::test]
async fn not_found_is_fetched_exactly_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let fetcher = Fetcher::new(&config.fetch).unwrap();

    let result = fetcher.fetch_page(&format!("{}/gone", server.uri())).await;
    assert!(matches!(result, Err(FetchError::NotFound { .. })));
}

#[tokio::test]
async fn eventual_success_returns_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healed"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/healed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let fetcher = Fetcher::new(&config.fetch).unwrap();

    let body = fetcher
        .fetch_page(&format!("{}/healed", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn full_search_filters_sorts_and_aggregates() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Page 1: 25 items, chairs at x100 and x105
    let mut page1_items = String::new();
    for i in 0..25 {
        let id = format!("x{}", 100 + i);
        let title = if i == 0 || i == 5 {
            format!("Vintage Chair {}", i)
        } else {
            format!("Vintage Table {}", i)
        };
        page1_items.push_str(&listing_anchor(&base, &id, &title));
    }
    let page1 = format!(
        "<html><body><p>2ページ中1ページ目</p>{}</body></html>",
        page1_items
    );

    // Page 2: 5 items, chairs at x200 and x203, plus a duplicate of x100
    // carrying a query string
    let mut page2_items = String::new();
    for i in 0..5 {
        let id = format!("x{}", 200 + i);
        let title = if i == 0 || i == 3 {
            format!("Classic chair {}", i)
        } else {
            format!("Classic lamp {}", i)
        };
        page2_items.push_str(&listing_anchor(&base, &id, &title));
    }
    page2_items.push_str(&format!(
        r#"<a href="{}/jp/auction/x100?ref=relisted">Vintage Chair 0</a>"#,
        base
    ));
    let page2 = format!(
        "<html><body><p>2ページ中2ページ目</p>{}</body></html>",
        page2_items
    );

    mount_listing_page(&server, 1, page1).await;
    mount_listing_page(&server, 2, page2).await;

    // Three closed sales in three different payload shapes, one open item
    mount_detail(
        &server,
        "x100",
        page_data_detail("Vintage Chair 0", 1000, "2024-03-01T00:00:00Z"),
    )
    .await;
    mount_detail(
        &server,
        "x105",
        r#"<html><body><script>window.__NEXT_DATA__ = {"props":{"pageProps":{"initialState":{"item":{"detail":{"item":{"productName":"Vintage Chair 5","price":"2000","endTime":"2024-03-03T00:00:00Z"}}}}}}};</script></body></html>"#
            .to_string(),
    )
    .await;
    mount_detail(
        &server,
        "x200",
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"initialState":{"item":{"detail":{"item":{"title":"Classic chair 0","price":3000,"endTime":"2024-03-02T00:00:00Z"}}}}}}}</script></body></html>"#
            .to_string(),
    )
    .await;
    mount_detail(
        &server,
        "x203",
        r#"<html><body><script>var pageData = {"items":{"title":"Classic chair 3","price":"9999","endTime":"2024-03-04T00:00:00Z","status":"open"}};</script></body></html>"#.to_string(),
    )
    .await;

    let config = test_config(&base);
    let query = seller_query("chair", Some(50));
    let (result, events) = run_and_collect(&query, &config).await;
    assert!(result.is_ok());

    // Stream shape: Status, Total(4), four Progress events, Complete
    assert!(matches!(events.first(), Some(ProgressEvent::Status { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Total { total: 4, .. })));

    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { current, total, .. } => Some((*current, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);

    let outcome = match events.last() {
        Some(ProgressEvent::Complete { data }) => data,
        other => panic!("expected Complete, got {:?}", other),
    };

    // The open item is excluded; the duplicate URL was fetched once
    assert_eq!(outcome.total_count, 3);
    let ids: Vec<_> = outcome.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["x105", "x200", "x100"], "sorted by end time descending");

    let stats = outcome.statistics.unwrap();
    assert_eq!(stats.average, 2000);
    assert_eq!(stats.max, 3000);
    assert_eq!(stats.min, 1000);
}

#[tokio::test]
async fn detail_failures_drop_items_without_aborting() {
    let server = MockServer::start().await;
    let base = server.uri();

    let page = format!(
        "<html><body>{}{}</body></html>",
        listing_anchor(&base, "ok1", "Oak chair"),
        listing_anchor(&base, "dead", "Pine chair"),
    );
    mount_listing_page(&server, 1, page).await;

    mount_detail(
        &server,
        "ok1",
        page_data_detail("Oak chair", 500, "2024-01-01T00:00:00Z"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/jp/auction/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(&base);
    let query = seller_query("chair", None);
    let (result, events) = run_and_collect(&query, &config).await;
    assert!(result.is_ok());

    // Progress still covers both URLs
    let max_progress = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { current, .. } => Some(*current),
            _ => None,
        })
        .max();
    assert_eq!(max_progress, Some(2));

    let outcome = match events.last() {
        Some(ProgressEvent::Complete { data }) => data,
        other => panic!("expected Complete, got {:?}", other),
    };
    assert_eq!(outcome.total_count, 1);
    assert_eq!(outcome.items[0].id, "ok1");
}

#[tokio::test]
async fn empty_filter_result_completes_immediately() {
    let server = MockServer::start().await;
    let base = server.uri();

    let page = format!(
        "<html><body>{}</body></html>",
        listing_anchor(&base, "x1", "Vintage Table")
    );
    mount_listing_page(&server, 1, page).await;

    let config = test_config(&base);
    let query = seller_query("chair", None);
    let (result, events) = run_and_collect(&query, &config).await;
    assert!(result.is_ok());

    let outcome = match events.last() {
        Some(ProgressEvent::Complete { data }) => data,
        other => panic!("expected Complete, got {:?}", other),
    };
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.total_count, 0);
    assert!(outcome.statistics.is_none());
}

#[tokio::test]
async fn listing_fetch_failure_is_fatal() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Page 1 promises two pages; page 2 is gone
    let page1 = format!(
        "<html><body><p>2ページ中</p>{}</body></html>",
        listing_anchor(&base, "x1", "chair")
    );
    mount_listing_page(&server, 1, page1).await;
    Mock::given(method("GET"))
        .and(path("/jp/show/rating"))
        .and(query_param("apg", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(&base);
    let query = seller_query("", None);
    let (result, events) = run_and_collect(&query, &config).await;
    assert!(result.is_ok());

    let last = events.last().expect("stream must have a terminal event");
    assert!(matches!(last, ProgressEvent::Error { .. }));
    // No Complete anywhere in the stream
    assert!(!events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Complete { .. })));
}

#[tokio::test]
async fn invalid_seller_url_fails_before_any_event() {
    let config = test_config("http://127.0.0.1:1");
    let query = SearchQuery {
        seller_url: "https://example.com/?auc_user_id=abc".to_string(),
        keyword: String::new(),
        limit: None,
    };

    let (result, events) = run_and_collect(&query, &config).await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert!(events.is_empty());
}

#[tokio::test]
async fn error_event_wrapper_reports_validation_in_stream() {
    let config = test_config("http://127.0.0.1:1");
    let query = SearchQuery {
        seller_url: "https://example.com/?auc_user_id=abc".to_string(),
        keyword: String::new(),
        limit: None,
    };

    let cancel = CancellationToken::new();
    let (sink, mut rx) = EventSink::channel(cancel.clone());
    rakusatsu::engine::run_search_with_error_events(&query, &config, &sink, &cancel).await;
    drop(sink);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProgressEvent::Error { .. }));
}

#[tokio::test]
async fn limit_caps_detail_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();

    let page = format!(
        "<html><body>{}{}{}</body></html>",
        listing_anchor(&base, "x1", "chair one"),
        listing_anchor(&base, "x2", "chair two"),
        listing_anchor(&base, "x3", "chair three"),
    );
    mount_listing_page(&server, 1, page).await;

    mount_detail(
        &server,
        "x1",
        page_data_detail("chair one", 100, "2024-01-01T00:00:00Z"),
    )
    .await;
    mount_detail(
        &server,
        "x2",
        page_data_detail("chair two", 200, "2024-01-02T00:00:00Z"),
    )
    .await;
    // x3 must never be fetched
    Mock::given(method("GET"))
        .and(path("/jp/auction/x3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&base);
    let query = seller_query("chair", Some(2));
    let (result, events) = run_and_collect(&query, &config).await;
    assert!(result.is_ok());

    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Total { total: 2, .. })));

    let outcome = match events.last() {
        Some(ProgressEvent::Complete { data }) => data,
        other => panic!("expected Complete, got {:?}", other),
    };
    assert_eq!(outcome.total_count, 2);
}
