//! Scraper dispatch: source configs become boxed scraper instances.
//!
//! A scraper invocation is infallible at the batch level. Per-keyword
//! failures degrade into simulated records with the error attached, so the
//! caller always gets exactly one record per keyword, in input order.

#[cfg(feature = "browser")]
pub mod hybrid;
pub mod request;
pub mod simulated;

use async_trait::async_trait;
#[cfg(not(feature = "browser"))]
use tracing::warn;

use crate::config::Settings;
use crate::models::{ScrapeMethod, SourceConfig, SourceKind, TrendRecord};

#[cfg(feature = "browser")]
use std::sync::Arc;

#[cfg(feature = "browser")]
use crate::browser::BrowserRegistry;
#[cfg(feature = "browser")]
use crate::models::EngineKind;

/// Shared state every scraper draws on.
pub struct ScrapeDeps {
    pub settings: Settings,
    #[cfg(feature = "browser")]
    pub engine: EngineKind,
    #[cfg(feature = "browser")]
    pub registry: Arc<BrowserRegistry>,
}

impl ScrapeDeps {
    #[cfg(feature = "browser")]
    pub fn new(settings: Settings, engine: EngineKind) -> Self {
        let registry = Arc::new(BrowserRegistry::new(&settings.browser));
        Self {
            settings,
            engine,
            registry,
        }
    }

    #[cfg(not(feature = "browser"))]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

/// A platform scraper.
///
/// `scrape` never fails as a whole: each keyword's outcome, live or
/// degraded, arrives as its own record, in input order.
#[async_trait]
pub trait Scraper: Send {
    fn source(&self) -> SourceKind;

    async fn scrape(&mut self, keywords: &[String], limit: usize) -> Vec<TrendRecord>;
}

/// Map a source config to a concrete scraper.
///
/// Unrecognized source names fall back to the method's default platform
/// instead of failing, so a config typo still produces records.
pub fn resolve(config: &SourceConfig, deps: &ScrapeDeps) -> Box<dyn Scraper> {
    let kind = config.kind();

    match config.scrape_method {
        #[cfg(feature = "browser")]
        ScrapeMethod::BrowserAutomation => match kind {
            Some(SourceKind::GoogleTrends) => {
                Box::new(hybrid::GoogleTrendsScraper::new(config, deps))
            }
            Some(SourceKind::Twitter) | None => Box::new(hybrid::TwitterScraper::new(config, deps)),
            // Platforms without a browser flow keep their own data shape
            Some(other) => Box::new(simulated::SimulatedScraper::new(other)),
        },
        #[cfg(not(feature = "browser"))]
        ScrapeMethod::BrowserAutomation => {
            warn!(
                "browser support not compiled in; '{}' degrades to simulated data",
                config.name
            );
            Box::new(simulated::SimulatedScraper::new(
                kind.unwrap_or(SourceKind::Twitter),
            ))
        }
        ScrapeMethod::Request => match kind {
            Some(SourceKind::Reddit) => Box::new(request::RedditScraper::new()),
            Some(SourceKind::Hackernews) | None => Box::new(request::HackerNewsScraper::new()),
            // No public search endpoint wired up for these
            Some(other) => Box::new(simulated::SimulatedScraper::new(other)),
        },
        ScrapeMethod::Simulated => Box::new(simulated::SimulatedScraper::new(
            kind.unwrap_or(SourceKind::Twitter),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps() -> ScrapeDeps {
        #[cfg(feature = "browser")]
        return ScrapeDeps::new(Settings::default(), EngineKind::default());
        #[cfg(not(feature = "browser"))]
        return ScrapeDeps::new(Settings::default());
    }

    fn config(name: &str, method: ScrapeMethod) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            scrape_method: method,
            session: None,
            wait_selector: None,
        }
    }

    #[test]
    fn request_dispatch_defaults_unknown_names_to_hackernews() {
        let scraper = resolve(&config("gopher", ScrapeMethod::Request), &deps());
        assert_eq!(scraper.source(), SourceKind::Hackernews);
    }

    #[test]
    fn request_dispatch_keeps_platform_shape_when_no_endpoint_exists() {
        let scraper = resolve(&config("pinterest", ScrapeMethod::Request), &deps());
        assert_eq!(scraper.source(), SourceKind::Pinterest);
    }

    #[cfg(feature = "browser")]
    #[test]
    fn browser_dispatch_keeps_platform_shape_for_commerce_sources() {
        let scraper = resolve(&config("amazon", ScrapeMethod::BrowserAutomation), &deps());
        assert_eq!(scraper.source(), SourceKind::Amazon);
    }

    #[test]
    fn request_dispatch_honors_reddit() {
        let scraper = resolve(&config("reddit", ScrapeMethod::Request), &deps());
        assert_eq!(scraper.source(), SourceKind::Reddit);
    }

    #[test]
    fn simulated_dispatch_keeps_the_named_platform() {
        let scraper = resolve(&config("youtube", ScrapeMethod::Simulated), &deps());
        assert_eq!(scraper.source(), SourceKind::Youtube);
    }

    #[cfg(feature = "browser")]
    #[test]
    fn browser_dispatch_defaults_unknown_names_to_twitter() {
        let scraper = resolve(&SourceConfig::named("friendster"), &deps());
        assert_eq!(scraper.source(), SourceKind::Twitter);
    }
}
