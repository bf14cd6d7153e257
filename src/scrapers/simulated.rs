//! Pure simulated scraper: no network, no browser, deterministic output.

use async_trait::async_trait;

use super::Scraper;
use crate::extract::simulate;
use crate::models::{ExtractionStrategy, SourceKind, TrendRecord};

pub struct SimulatedScraper {
    kind: SourceKind,
}

impl SimulatedScraper {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Scraper for SimulatedScraper {
    fn source(&self) -> SourceKind {
        self.kind
    }

    async fn scrape(&mut self, keywords: &[String], limit: usize) -> Vec<TrendRecord> {
        let today = chrono::Utc::now().date_naive();

        keywords
            .iter()
            .map(|keyword| {
                let data = simulate::source_payload(self.kind, keyword, limit, today);
                let mut record =
                    TrendRecord::new(keyword, self.kind, data, ExtractionStrategy::Simulated);
                if self.kind == SourceKind::GoogleTrends {
                    record = record.with_related(simulate::related_queries(keyword));
                }
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_record_per_keyword_in_order() {
        let keywords: Vec<String> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut scraper = SimulatedScraper::new(SourceKind::Twitter);

        let records = scraper.scrape(&keywords, 5).await;

        assert_eq!(records.len(), 3);
        for (record, keyword) in records.iter().zip(&keywords) {
            assert_eq!(&record.keyword, keyword);
            assert_eq!(record.source, "twitter");
            assert_eq!(record.strategy, ExtractionStrategy::Simulated);
            assert!(record.error.is_none());
            assert!(!record.data.is_null());
        }
    }

    #[tokio::test]
    async fn trends_records_carry_related_queries() {
        let mut scraper = SimulatedScraper::new(SourceKind::GoogleTrends);
        let records = scraper.scrape(&["espresso".to_string()], 5).await;
        assert!(records[0].related_queries.is_some());
    }
}
