//! Lightweight request scrapers for sources with public JSON endpoints.
//! No browser involved; failures degrade per keyword into simulated data.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::Scraper;
use crate::error::ScrapeError;
use crate::extract::simulate;
use crate::models::{ExtractionStrategy, SourceKind, TrendRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const USER_AGENT: &str = concat!("trendacquire/", env!("CARGO_PKG_VERSION"));

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

fn degraded(kind: SourceKind, keyword: &str, limit: usize, reason: &str) -> TrendRecord {
    let today = chrono::Utc::now().date_naive();
    TrendRecord::new(
        keyword,
        kind,
        simulate::source_payload(kind, keyword, limit, today),
        ExtractionStrategy::Simulated,
    )
    .with_error(reason)
}

/// Hacker News via the Algolia search API.
pub struct HackerNewsScraper {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNewsScraper {
    pub fn new() -> Self {
        Self::with_base_url("https://hn.algolia.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Value>, String> {
        let mut url = url::Url::parse(&self.base_url).map_err(|err| err.to_string())?;
        url.set_path("/api/v1/search");
        url.query_pairs_mut()
            .append_pair("query", keyword)
            .append_pair("hitsPerPage", &limit.to_string());
        debug!("GET {url}");

        let body: Value = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|err| err.to_string())?
            .error_for_status()
            .map_err(|err| err.to_string())?
            .json()
            .await
            .map_err(|err| err.to_string())?;

        let hits = body
            .get("hits")
            .and_then(|h| h.as_array())
            .ok_or("response missing hits")?;

        Ok(hits
            .iter()
            .take(limit)
            .map(|hit| {
                json!({
                    "title": hit.get("title").cloned().unwrap_or(Value::Null),
                    "points": hit.get("points").cloned().unwrap_or(Value::Null),
                    "num_comments": hit.get("num_comments").cloned().unwrap_or(Value::Null),
                    "url": hit.get("url").cloned().unwrap_or(Value::Null),
                    "created_at": hit.get("created_at").cloned().unwrap_or(Value::Null),
                })
            })
            .collect())
    }
}

impl Default for HackerNewsScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for HackerNewsScraper {
    fn source(&self) -> SourceKind {
        SourceKind::Hackernews
    }

    async fn scrape(&mut self, keywords: &[String], limit: usize) -> Vec<TrendRecord> {
        let mut records = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let record = match self.search(keyword, limit).await {
                Ok(hits) if !hits.is_empty() => TrendRecord::new(
                    keyword,
                    SourceKind::Hackernews,
                    Value::Array(hits),
                    ExtractionStrategy::PrimarySelectors,
                ),
                Ok(_) => {
                    warn!("no hackernews hits for '{keyword}', simulating");
                    degraded(SourceKind::Hackernews, keyword, limit, "no search hits")
                }
                Err(reason) => {
                    let err = ScrapeError::Extraction(reason);
                    warn!("hackernews search for '{keyword}' failed: {err}");
                    degraded(SourceKind::Hackernews, keyword, limit, &err.to_string())
                }
            };
            records.push(record);
        }
        records
    }
}

/// Reddit via the public search JSON endpoint.
pub struct RedditScraper {
    client: reqwest::Client,
    base_url: String,
}

impl RedditScraper {
    pub fn new() -> Self {
        Self::with_base_url("https://www.reddit.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Value>, String> {
        let mut url = url::Url::parse(&self.base_url).map_err(|err| err.to_string())?;
        url.set_path("/search.json");
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("limit", &limit.to_string())
            .append_pair("sort", "relevance");
        debug!("GET {url}");

        let body: Value = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|err| err.to_string())?
            .error_for_status()
            .map_err(|err| err.to_string())?
            .json()
            .await
            .map_err(|err| err.to_string())?;

        let children = body
            .pointer("/data/children")
            .and_then(|c| c.as_array())
            .ok_or("response missing data.children")?;

        Ok(children
            .iter()
            .filter_map(|child| child.get("data"))
            .take(limit)
            .map(|post| {
                json!({
                    "title": post.get("title").cloned().unwrap_or(Value::Null),
                    "subreddit": post.get("subreddit_name_prefixed").cloned().unwrap_or(Value::Null),
                    "score": post.get("score").cloned().unwrap_or(Value::Null),
                    "num_comments": post.get("num_comments").cloned().unwrap_or(Value::Null),
                    "created": post.get("created_utc").cloned().unwrap_or(Value::Null),
                })
            })
            .collect())
    }
}

impl Default for RedditScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for RedditScraper {
    fn source(&self) -> SourceKind {
        SourceKind::Reddit
    }

    async fn scrape(&mut self, keywords: &[String], limit: usize) -> Vec<TrendRecord> {
        let mut records = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let record = match self.search(keyword, limit).await {
                Ok(posts) if !posts.is_empty() => TrendRecord::new(
                    keyword,
                    SourceKind::Reddit,
                    Value::Array(posts),
                    ExtractionStrategy::PrimarySelectors,
                ),
                Ok(_) => {
                    warn!("no reddit results for '{keyword}', simulating");
                    degraded(SourceKind::Reddit, keyword, limit, "no search results")
                }
                Err(reason) => {
                    let err = ScrapeError::Extraction(reason);
                    warn!("reddit search for '{keyword}' failed: {err}");
                    degraded(SourceKind::Reddit, keyword, limit, &err.to_string())
                }
            };
            records.push(record);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Closed port: connections are refused immediately, no real traffic
    const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn unreachable_endpoint_degrades_per_keyword() {
        let mut scraper = HackerNewsScraper::with_base_url(DEAD_ENDPOINT);
        let keywords = vec!["rust".to_string(), "zig".to_string()];

        let records = scraper.scrape(&keywords, 3).await;

        assert_eq!(records.len(), 2);
        for (record, keyword) in records.iter().zip(&keywords) {
            assert_eq!(&record.keyword, keyword);
            assert_eq!(record.strategy, ExtractionStrategy::Simulated);
            assert!(record.error.is_some());
            assert!(!record.data.is_null());
        }
    }

    #[tokio::test]
    async fn reddit_failure_keeps_per_keyword_errors() {
        let mut scraper = RedditScraper::with_base_url(DEAD_ENDPOINT);
        let records = scraper.scrape(&["espresso".to_string()], 5).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "reddit");
        assert!(records[0].error.is_some());
    }
}
