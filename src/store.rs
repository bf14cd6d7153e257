//! SQLite persistence for scraped trends and registered data sources.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::debug;

use crate::models::{ScrapeMethod, SourceConfig, TrendRecord};

/// A persisted trend row, as the analyzer consumes it.
#[derive(Debug, Clone)]
pub struct StoredTrend {
    pub keyword: String,
    pub source: String,
    pub data: Value,
    pub timestamp: String,
}

/// SQLite-backed trend store. Opens a connection per call; the schema is
/// created on first use.
pub struct TrendStore {
    db_path: PathBuf,
}

impl TrendStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
        }
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("could not open database {}", self.db_path.display()))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS keyword_trends (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                niche TEXT NOT NULL,
                keyword TEXT NOT NULL,
                source TEXT NOT NULL,
                data TEXT NOT NULL,
                region TEXT,
                city TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS data_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                source_name TEXT NOT NULL,
                source_url TEXT,
                source_type TEXT,
                auth_type TEXT,
                auth_credentials TEXT,
                scrape_method TEXT NOT NULL DEFAULT 'browser-automation',
                extra_params TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_trends_niche
                ON keyword_trends (niche, keyword);
        "#,
        )?;
        Ok(())
    }

    /// Persist one scrape record under its niche.
    pub fn save_record(&self, niche: &str, record: &TrendRecord) -> Result<()> {
        let conn = self.connect()?;
        let data = serde_json::to_string(&record.data)?;
        conn.execute(
            "INSERT INTO keyword_trends (niche, keyword, source, data) VALUES (?1, ?2, ?3, ?4)",
            params![niche, record.keyword, record.source, data],
        )?;
        debug!(
            "saved {} record for '{}' in niche '{niche}'",
            record.source, record.keyword
        );
        Ok(())
    }

    /// Recent trends, optionally narrowed by niche and keyword.
    pub fn trends(
        &self,
        niche: Option<&str>,
        keyword: Option<&str>,
        days: u32,
    ) -> Result<Vec<StoredTrend>> {
        let conn = self.connect()?;
        let mut sql = String::from(
            "SELECT keyword, source, data, timestamp FROM keyword_trends \
             WHERE timestamp >= datetime('now', '-' || ?1 || ' days')",
        );
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(days)];

        if let Some(niche) = niche {
            sql.push_str(&format!(" AND niche = ?{}", args.len() + 1));
            args.push(Box::new(niche.to_string()));
        }
        if let Some(keyword) = keyword {
            sql.push_str(&format!(" AND keyword = ?{}", args.len() + 1));
            args.push(Box::new(keyword.to_string()));
        }
        sql.push_str(" ORDER BY timestamp DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| {
            Ok(StoredTrend {
                keyword: row.get(0)?,
                source: row.get(1)?,
                data: serde_json::from_str(&row.get::<_, String>(2)?)
                    .unwrap_or(Value::Null),
                timestamp: row.get(3)?,
            })
        })?;

        let mut trends = Vec::new();
        for row in rows {
            trends.push(row?);
        }
        Ok(trends)
    }

    /// Register a data source under a category.
    pub fn add_source(
        &self,
        category: &str,
        config: &SourceConfig,
        url: Option<&str>,
    ) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO data_sources (category, source_name, source_url, scrape_method, extra_params) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category,
                config.name,
                url,
                config.scrape_method.to_string(),
                serde_json::to_string(&serde_json::json!({
                    "session": config.session,
                    "wait_selector": config.wait_selector,
                }))?,
            ],
        )?;
        Ok(())
    }

    /// All registered sources for a category, as dispatchable configs.
    pub fn sources_by_category(&self, category: &str) -> Result<Vec<SourceConfig>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT source_name, scrape_method, extra_params FROM data_sources \
             WHERE category = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![category], |row| {
            let name: String = row.get(0)?;
            let method: String = row.get(1)?;
            let extra: Option<String> = row.get(2)?;
            Ok((name, method, extra))
        })?;

        let mut configs = Vec::new();
        for row in rows {
            let (name, method, extra) = row?;
            let scrape_method = serde_yaml::from_str::<ScrapeMethod>(&method)
                .unwrap_or_default();
            let extra: Value = extra
                .and_then(|raw| serde_json::from_str(&raw).ok())
                .unwrap_or(Value::Null);

            configs.push(SourceConfig {
                name,
                scrape_method,
                session: extra
                    .get("session")
                    .and_then(|s| s.as_str())
                    .map(String::from),
                wait_selector: extra
                    .get("wait_selector")
                    .and_then(|s| s.as_str())
                    .map(String::from),
            });
        }
        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractionStrategy, SourceKind};
    use serde_json::json;

    fn store() -> (tempfile::TempDir, TrendStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TrendStore::open(&dir.path().join("trends.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn saved_records_come_back_filtered_by_niche() {
        let (_dir, store) = store();

        let record = TrendRecord::new(
            "espresso",
            SourceKind::Twitter,
            json!([{"text": "espresso post"}]),
            ExtractionStrategy::PrimarySelectors,
        );
        store.save_record("coffee", &record).unwrap();
        store
            .save_record("tech", &TrendRecord::new(
                "rust",
                SourceKind::Hackernews,
                json!([]),
                ExtractionStrategy::Simulated,
            ))
            .unwrap();

        let coffee = store.trends(Some("coffee"), None, 7).unwrap();
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].keyword, "espresso");
        assert_eq!(coffee[0].source, "twitter");
        assert_eq!(coffee[0].data, json!([{"text": "espresso post"}]));

        let all = store.trends(None, None, 7).unwrap();
        assert_eq!(all.len(), 2);

        let by_keyword = store.trends(None, Some("rust"), 7).unwrap();
        assert_eq!(by_keyword.len(), 1);
    }

    #[test]
    fn source_registry_roundtrips_configs() {
        let (_dir, store) = store();

        let config = SourceConfig {
            name: "hackernews".to_string(),
            scrape_method: crate::models::ScrapeMethod::Request,
            session: None,
            wait_selector: Some(".story".to_string()),
        };
        store.add_source("tech", &config, Some("https://news.ycombinator.com")).unwrap();

        let configs = store.sources_by_category("tech").unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "hackernews");
        assert_eq!(configs[0].scrape_method, crate::models::ScrapeMethod::Request);
        assert_eq!(configs[0].wait_selector.as_deref(), Some(".story"));

        assert!(store.sources_by_category("coffee").unwrap().is_empty());
    }
}
