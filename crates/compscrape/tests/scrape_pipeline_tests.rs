//! End-to-end tests: table file → worklist → mocked pages → records.

mod common;

use std::io::Write;
use std::time::Duration;

use compscrape::utils::ScrapeStats;
use compscrape::{
    EmployeeCount, NOT_FOUND, PageOutcome, ResolveError, Roster, ScraperError, UrlTable,
    WebScraper, resolve_worklist,
};
use futures::StreamExt;
use wiremock::MockServer;

fn write_table(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(json.as_bytes())
        .expect("Failed to write table");
    file
}

async fn collect(scraper: &WebScraper, urls: &[String], concurrency: usize) -> Vec<PageOutcome> {
    scraper
        .scrape_worklist(urls, concurrency)
        .collect::<Vec<_>>()
        .await
}

#[tokio::test]
async fn test_single_company_end_to_end() {
    let server = MockServer::start().await;
    common::mount_page(
        &server,
        "/company/acme",
        &common::profile_html("Acme", "2,500", "Utilities"),
    )
    .await;

    let url = format!("{}/company/acme", server.uri());
    let table_file = write_table(&format!(r#"[{{"Acme": "{url}"}}]"#));

    let table = UrlTable::from_path(table_file.path()).expect("Failed to load table");
    let worklist =
        resolve_worklist(&table, &Roster::from_names(["Acme"])).expect("Failed to resolve");
    assert_eq!(worklist.urls(), [url.clone()]);

    let scraper = WebScraper::new().expect("Failed to create scraper");
    let outcomes = collect(&scraper, worklist.urls(), 1).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].url, url);
    let record = outcomes[0].result.as_ref().expect("Page should be scraped");
    assert_eq!(record.company_name, "Acme");
    assert_eq!(record.linkedin_followers_count, 2500);
    assert_eq!(record.industry, "Utilities");
    assert_eq!(record.headquarters, NOT_FOUND);
    assert_eq!(record.funding_total_rounds, 0);
    assert_eq!(record.num_of_employees, EmployeeCount::default());
}

#[tokio::test]
async fn test_failed_page_does_not_stop_the_run() {
    let server = MockServer::start().await;
    common::mount_page(
        &server,
        "/company/acme",
        &common::profile_html("Acme", "10", "Utilities"),
    )
    .await;
    common::mount_status(&server, "/company/gone", 404).await;
    common::mount_page(
        &server,
        "/company/globex",
        &common::profile_html("Globex", "20", "Law Practice"),
    )
    .await;

    let urls = vec![
        format!("{}/company/acme", server.uri()),
        format!("{}/company/gone", server.uri()),
        format!("{}/company/globex", server.uri()),
    ];

    let scraper = WebScraper::new().expect("Failed to create scraper");
    let outcomes = collect(&scraper, &urls, 1).await;

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes[1].result,
        Err(ScraperError::HttpError(_))
    ));
    assert_eq!(
        outcomes[2].result.as_ref().unwrap().company_name,
        "Globex"
    );

    let stats = ScrapeStats::from_outcomes(&outcomes);
    assert_eq!(stats.attempted, 3);
    assert_eq!(stats.emitted, 2);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_concurrent_scrape_keeps_worklist_order() {
    let server = MockServer::start().await;
    let names = ["Acme", "Globex", "Initech", "Umbrella"];
    for name in names {
        common::mount_page(
            &server,
            &format!("/company/{}", name.to_lowercase()),
            &common::profile_html(name, "1", "Utilities"),
        )
        .await;
    }

    let urls: Vec<String> = names
        .iter()
        .map(|n| format!("{}/company/{}", server.uri(), n.to_lowercase()))
        .collect();

    let scraper = WebScraper::new().expect("Failed to create scraper");
    let outcomes = collect(&scraper, &urls, 3).await;

    let scraped: Vec<&str> = outcomes
        .iter()
        .map(|o| o.result.as_ref().unwrap().company_name.as_str())
        .collect();
    assert_eq!(scraped, names);
    assert!(outcomes.iter().enumerate().all(|(i, o)| o.index == i && o.total == 4));
}

async fn arrivals_with_slow_first_page(concurrency: usize) -> Vec<(String, std::time::Instant)> {
    let server = MockServer::start().await;
    let arrivals = common::ArrivalLog::default();
    common::mount_timed_page(
        &server,
        "/company/slow",
        &common::profile_html("Slow", "1", "Utilities"),
        Duration::from_millis(400),
        &arrivals,
    )
    .await;
    common::mount_timed_page(
        &server,
        "/company/fast",
        &common::profile_html("Fast", "2", "Utilities"),
        Duration::ZERO,
        &arrivals,
    )
    .await;

    let urls = vec![
        format!("{}/company/slow", server.uri()),
        format!("{}/company/fast", server.uri()),
    ];
    let scraper = WebScraper::new().expect("Failed to create scraper");
    let outcomes = collect(&scraper, &urls, concurrency).await;
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    let arrivals = arrivals.lock().unwrap().clone();
    arrivals
}

#[tokio::test]
async fn test_sequential_scrape_waits_for_previous_page() {
    let arrivals = arrivals_with_slow_first_page(1).await;

    assert_eq!(arrivals.len(), 2);
    assert_eq!(arrivals[0].0, "/company/slow");
    assert_eq!(arrivals[1].0, "/company/fast");
    let gap = arrivals[1].1.duration_since(arrivals[0].1);
    assert!(
        gap >= Duration::from_millis(400),
        "second request sent {:?} after the first, before it was answered",
        gap
    );
}

#[tokio::test]
async fn test_concurrent_scrape_overlaps_requests() {
    let arrivals = arrivals_with_slow_first_page(2).await;

    assert_eq!(arrivals.len(), 2);
    let (first, second) = (arrivals[0].1, arrivals[1].1);
    let gap = if second > first {
        second.duration_since(first)
    } else {
        first.duration_since(second)
    };
    assert!(gap < Duration::from_millis(400), "requests were not overlapped: {:?}", gap);
}

#[tokio::test]
async fn test_empty_body_is_reported() {
    let server = MockServer::start().await;
    common::mount_page(&server, "/company/blank", "   ").await;

    let scraper = WebScraper::new().expect("Failed to create scraper");
    let err = scraper
        .fetch_company(&format!("{}/company/blank", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::EmptyResponse(_)));
}

#[test]
fn test_malformed_table_file_is_fatal() {
    let table_file = write_table(r#"{"Acme": "https://acme.example/co"}"#);
    let err = UrlTable::from_path(table_file.path()).unwrap_err();
    assert!(matches!(err, ResolveError::MalformedTable(_)));
}
