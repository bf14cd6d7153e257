//! Twitter keyword search via the live timeline.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{shot_name, HybridCore};
use crate::browser::NavOutcome;
use crate::extract::{posts, simulate};
use crate::models::{ExtractionStrategy, SourceConfig, SourceKind, TrendRecord};
use crate::scrapers::{ScrapeDeps, Scraper};

const SEARCH_URL: &str = "https://twitter.com/search";
const DEFAULT_MARKER: &str = "article[data-testid='tweet']";

pub struct TwitterScraper {
    core: HybridCore,
}

impl TwitterScraper {
    pub fn new(config: &SourceConfig, deps: &ScrapeDeps) -> Self {
        Self {
            core: HybridCore::new(config, deps, SourceKind::Twitter),
        }
    }

    fn search_url(keyword: &str) -> String {
        format!(
            "{SEARCH_URL}?q={}&src=typed_query&f=live",
            urlencoding::encode(keyword)
        )
    }
}

#[async_trait]
impl Scraper for TwitterScraper {
    fn source(&self) -> SourceKind {
        SourceKind::Twitter
    }

    async fn scrape(&mut self, keywords: &[String], limit: usize) -> Vec<TrendRecord> {
        let today = chrono::Utc::now().date_naive();
        let mut records = Vec::with_capacity(keywords.len());

        let ctx = match self.core.open_context().await {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!("could not open twitter context: {err}");
                for keyword in keywords {
                    records.push(
                        TrendRecord::new(
                            keyword,
                            SourceKind::Twitter,
                            Value::Array(simulate::posts(keyword, limit, today)),
                            ExtractionStrategy::Simulated,
                        )
                        .with_error(err.to_string()),
                    );
                }
                return records;
            }
        };

        for keyword in keywords {
            let url = Self::search_url(keyword);
            let shot = shot_name(SourceKind::Twitter, keyword);
            let marker = self.core.marker(DEFAULT_MARKER);

            let nav = self
                .core
                .navigator()
                .navigate(ctx.page(), &url, Some(marker), &shot)
                .await;

            let record = match nav {
                Err(err) => {
                    warn!("twitter navigation for '{keyword}' failed: {err}");
                    TrendRecord::new(
                        keyword,
                        SourceKind::Twitter,
                        Value::Array(simulate::posts(keyword, limit, today)),
                        ExtractionStrategy::Simulated,
                    )
                    .with_error(err.to_string())
                }
                Ok(outcome) => {
                    let extracted = posts::extract(ctx.page(), keyword, limit, today).await;
                    let simulated = extracted.is_simulated();

                    let mut record = TrendRecord::new(
                        keyword,
                        SourceKind::Twitter,
                        Value::Array(extracted.data),
                        extracted.strategy,
                    );

                    if simulated {
                        let (shot_path, error) = match outcome {
                            NavOutcome::MarkerTimeout { screenshot, reason } => {
                                (screenshot, reason)
                            }
                            NavOutcome::Ready => (
                                ctx.save_screenshot(self.core.screenshot_dir(), &shot).await,
                                "no extractable timeline markup; simulated data substituted"
                                    .to_string(),
                            ),
                        };
                        record = record.with_error(error).with_screenshot(shot_path);
                    }
                    record
                }
            };
            records.push(record);
        }

        ctx.close().await;
        records
    }
}
