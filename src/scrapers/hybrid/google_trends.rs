//! Google Trends interest-over-time via the explore page.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{shot_name, HybridCore};
use crate::browser::NavOutcome;
use crate::extract::{simulate, trends};
use crate::models::{ExtractionStrategy, SourceConfig, SourceKind, TrendRecord};
use crate::scrapers::{ScrapeDeps, Scraper};

const EXPLORE_URL: &str = "https://trends.google.com/trends/explore";
const DEFAULT_MARKER: &str = ".fe-line-chart";

pub struct GoogleTrendsScraper {
    core: HybridCore,
}

impl GoogleTrendsScraper {
    pub fn new(config: &SourceConfig, deps: &ScrapeDeps) -> Self {
        Self {
            core: HybridCore::new(config, deps, SourceKind::GoogleTrends),
        }
    }

    fn explore_url(keyword: &str) -> String {
        // Last 90 days, matching the simulated series window
        format!(
            "{EXPLORE_URL}?q={}&date=today%203-m",
            urlencoding::encode(keyword)
        )
    }
}

fn series_json(series: &trends::TrendSeries) -> Value {
    Value::Object(
        series
            .iter()
            .map(|(day, value)| (day.to_string(), Value::from(*value)))
            .collect(),
    )
}

#[async_trait]
impl Scraper for GoogleTrendsScraper {
    fn source(&self) -> SourceKind {
        SourceKind::GoogleTrends
    }

    async fn scrape(&mut self, keywords: &[String], _limit: usize) -> Vec<TrendRecord> {
        let today = chrono::Utc::now().date_naive();
        let mut records = Vec::with_capacity(keywords.len());

        let ctx = match self.core.open_context().await {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!("could not open trends context: {err}");
                for keyword in keywords {
                    records.push(
                        TrendRecord::new(
                            keyword,
                            SourceKind::GoogleTrends,
                            series_json(&simulate::trend_series(keyword, today)),
                            ExtractionStrategy::Simulated,
                        )
                        .with_related(simulate::related_queries(keyword))
                        .with_error(err.to_string()),
                    );
                }
                return records;
            }
        };

        for keyword in keywords {
            let url = Self::explore_url(keyword);
            let shot = shot_name(SourceKind::GoogleTrends, keyword);
            let marker = self.core.marker(DEFAULT_MARKER);

            let nav = self
                .core
                .navigator()
                .navigate(ctx.page(), &url, Some(marker), &shot)
                .await;

            let record = match nav {
                Err(err) => {
                    warn!("trends navigation for '{keyword}' failed: {err}");
                    TrendRecord::new(
                        keyword,
                        SourceKind::GoogleTrends,
                        series_json(&simulate::trend_series(keyword, today)),
                        ExtractionStrategy::Simulated,
                    )
                    .with_related(simulate::related_queries(keyword))
                    .with_error(err.to_string())
                }
                Ok(outcome) => {
                    let extracted = trends::extract(ctx.page(), keyword, today).await;
                    let simulated = extracted.is_simulated();
                    let (series, related) = extracted.data;

                    let mut record = TrendRecord::new(
                        keyword,
                        SourceKind::GoogleTrends,
                        series_json(&series),
                        extracted.strategy,
                    )
                    .with_related(related);

                    if simulated {
                        let (shot_path, error) = match outcome {
                            NavOutcome::MarkerTimeout { screenshot, reason } => {
                                (screenshot, reason)
                            }
                            NavOutcome::Ready => (
                                ctx.save_screenshot(self.core.screenshot_dir(), &shot).await,
                                "no extractable trend markup; simulated data substituted"
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
