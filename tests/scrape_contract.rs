//! End-to-end contract of the scraping core, exercised without a browser
//! or the network: dispatch, degradation, persistence, and analysis.

use chrono::NaiveDate;

use trendacquire::analyzer::{self, StatKind};
use trendacquire::config::Settings;
use trendacquire::extract::simulate;
use trendacquire::models::{
    EngineKind, ExtractionStrategy, ScrapeMethod, SourceConfig, SourceKind, TrendRecord,
};
use trendacquire::scrapers::{self, ScrapeDeps, Scraper};
use trendacquire::store::TrendStore;

fn deps() -> ScrapeDeps {
    #[cfg(feature = "browser")]
    return ScrapeDeps::new(Settings::default(), EngineKind::default());
    #[cfg(not(feature = "browser"))]
    return ScrapeDeps::new(Settings::default());
}

fn source(name: &str, method: ScrapeMethod) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        scrape_method: method,
        session: None,
        wait_selector: None,
    }
}

#[tokio::test]
async fn simulated_scrape_yields_one_record_per_keyword_in_order() {
    let keywords: Vec<String> = ["espresso", "cold brew", "v60"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut scraper = scrapers::resolve(
        &source("google_trends", ScrapeMethod::Simulated),
        &deps(),
    );
    let records = scraper.scrape(&keywords, 5).await;

    assert_eq!(records.len(), keywords.len());
    for (record, keyword) in records.iter().zip(&keywords) {
        assert_eq!(&record.keyword, keyword);
        assert_eq!(record.source, "google_trends");
        assert_eq!(record.strategy, ExtractionStrategy::Simulated);
        assert!(record.error.is_none());
        assert!(record.data.is_object(), "trend payload should be a series");
        assert!(record.related_queries.is_some());
    }
}

#[test]
fn unknown_request_source_falls_back_without_failing() {
    // A name nobody recognizes still dispatches instead of erroring
    let scraper = scrapers::resolve(&source("usenet", ScrapeMethod::Request), &deps());
    assert_eq!(scraper.source(), SourceKind::Hackernews);

    let scraper = scrapers::resolve(&source("usenet", ScrapeMethod::Simulated), &deps());
    assert_eq!(scraper.source(), SourceKind::Twitter);
}

#[test]
fn simulation_is_stable_within_a_day_and_distinct_across_keywords() {
    let day = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

    for kind in [SourceKind::Twitter, SourceKind::Reddit, SourceKind::News] {
        assert_eq!(
            simulate::source_payload(kind, "matcha", 4, day),
            simulate::source_payload(kind, "matcha", 4, day),
        );
    }
    assert_ne!(
        simulate::source_payload(SourceKind::Twitter, "matcha", 4, day),
        simulate::source_payload(SourceKind::Twitter, "oolong", 4, day),
    );
}

#[tokio::test]
async fn scraped_records_flow_through_store_and_analyzer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TrendStore::open(&dir.path().join("trends.db")).expect("open store");

    let keywords = vec!["espresso".to_string(), "aeropress".to_string()];
    let mut scraper = scrapers::resolve(
        &source("google_trends", ScrapeMethod::Simulated),
        &deps(),
    );
    for record in scraper.scrape(&keywords, 5).await {
        store.save_record("coffee", &record).expect("save");
    }

    let stored = store.trends(Some("coffee"), None, 7).expect("load");
    assert_eq!(stored.len(), 2);

    let analysis = analyzer::analyze(&stored);
    assert_eq!(analysis.stats.len(), 2);
    for entry in &analysis.stats {
        assert!(
            matches!(entry.stats, StatKind::Series { .. }),
            "trend payloads analyze as series"
        );
    }
    // Every keyword with a series gets a forecast
    assert!(analysis.predictions.contains_key("espresso"));
    assert!(analysis.predictions.contains_key("aeropress"));
}

#[tokio::test]
async fn unreachable_request_endpoint_degrades_per_keyword() {
    use trendacquire::scrapers::request::HackerNewsScraper;

    // Closed port: refused immediately, no real traffic
    let mut scraper = HackerNewsScraper::with_base_url("http://127.0.0.1:9");
    let keywords = vec!["rust".to_string(), "zig".to_string()];

    let records: Vec<TrendRecord> = scraper.scrape(&keywords, 3).await;

    assert_eq!(records.len(), 2);
    for (record, keyword) in records.iter().zip(&keywords) {
        assert_eq!(&record.keyword, keyword);
        assert_eq!(record.strategy, ExtractionStrategy::Simulated);
        assert!(record.error.is_some(), "degraded record keeps its error");
        assert!(!record.data.is_null(), "degraded record still carries data");
    }
}

#[test]
fn sessions_roundtrip_through_the_store() {
    use trendacquire::browser::{SessionCookie, SessionStore};

    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path());

    assert!(!store.exists("twitter"));
    store
        .save(
            "twitter",
            &[SessionCookie {
                name: "auth_token".to_string(),
                value: "tok".to_string(),
                domain: ".twitter.com".to_string(),
                path: "/".to_string(),
                secure: true,
                http_only: true,
            }],
        )
        .expect("save session");

    assert!(store.exists("twitter"));
    let cookies = store.load("twitter").expect("load").expect("present");
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "auth_token");
}
