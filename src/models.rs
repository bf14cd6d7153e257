//! Core data model: the scrape contract and the closed dispatch enums.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Browser engine channels the registry can launch.
///
/// The automation stack speaks CDP, so all kinds are Chromium-family
/// channels. `Chromium` is the designated fallback when another kind fails
/// to launch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Chromium,
    Chrome,
    Edge,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Chrome => write!(f, "chrome"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// How a source is scraped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrapeMethod {
    /// Shared-engine browser automation with session reuse.
    #[default]
    BrowserAutomation,
    /// Plain HTTP requests against a public API or endpoint.
    #[serde(alias = "lightweight-request")]
    Request,
    /// Deterministic keyword-seeded data, no network at all.
    Simulated,
}

impl fmt::Display for ScrapeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrowserAutomation => write!(f, "browser-automation"),
            Self::Request => write!(f, "request"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// Closed set of supported platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleTrends,
    Twitter,
    Reddit,
    #[serde(alias = "hacker_news")]
    Hackernews,
    Instagram,
    Youtube,
    News,
    Pinterest,
    Linkedin,
    Amazon,
    Ebay,
    Otto,
}

impl SourceKind {
    /// Parse a configured source name. Returns `None` for unrecognized
    /// names; dispatch maps those to a per-method default variant rather
    /// than an error.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "google_trends" | "googletrends" | "trends" => Some(Self::GoogleTrends),
            "twitter" | "x" => Some(Self::Twitter),
            "reddit" => Some(Self::Reddit),
            "hackernews" | "hacker_news" | "hn" => Some(Self::Hackernews),
            "instagram" => Some(Self::Instagram),
            "youtube" => Some(Self::Youtube),
            "news" => Some(Self::News),
            "pinterest" => Some(Self::Pinterest),
            "linkedin" | "linked_in" => Some(Self::Linkedin),
            "amazon" => Some(Self::Amazon),
            "ebay" => Some(Self::Ebay),
            "otto" => Some(Self::Otto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleTrends => "google_trends",
            Self::Twitter => "twitter",
            Self::Reddit => "reddit",
            Self::Hackernews => "hackernews",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::News => "news",
            Self::Pinterest => "pinterest",
            Self::Linkedin => "linkedin",
            Self::Amazon => "amazon",
            Self::Ebay => "ebay",
            Self::Otto => "otto",
        }
    }

    /// Session name a browser-backed scrape of this platform reuses, if the
    /// platform has an authenticated flow.
    pub fn default_session(&self) -> Option<&'static str> {
        match self {
            Self::GoogleTrends => Some("google"),
            Self::Twitter => Some("twitter"),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which step of the fallback chain produced a record's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    PrimarySelectors,
    AlternateSelectors,
    TextPattern,
    Simulated,
}

/// Related search query attached to a trend record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedQuery {
    pub query: String,
    pub value: i64,
}

/// One (keyword, source) scrape outcome.
///
/// `data` is always populated: on total failure it carries simulated data
/// and `error` describes what went wrong. A scraper invocation yields
/// exactly one record per requested keyword, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRecord {
    pub keyword: String,
    pub source: String,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_queries: Option<Vec<RelatedQuery>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub strategy: ExtractionStrategy,
}

impl TrendRecord {
    pub fn new(
        keyword: &str,
        source: SourceKind,
        data: serde_json::Value,
        strategy: ExtractionStrategy,
    ) -> Self {
        Self {
            keyword: keyword.to_string(),
            source: source.as_str().to_string(),
            data,
            related_queries: None,
            screenshot: None,
            error: None,
            strategy,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_screenshot(mut self, screenshot: Option<PathBuf>) -> Self {
        self.screenshot = screenshot;
        self
    }

    pub fn with_related(mut self, related: Vec<RelatedQuery>) -> Self {
        self.related_queries = Some(related);
        self
    }
}

/// A source definition as resolved by dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub scrape_method: ScrapeMethod,
    /// Session name override; defaults per platform.
    #[serde(default)]
    pub session: Option<String>,
    /// Readiness marker override for browser navigation.
    #[serde(default)]
    pub wait_selector: Option<String>,
}

impl SourceConfig {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scrape_method: ScrapeMethod::default(),
            session: None,
            wait_selector: None,
        }
    }

    pub fn kind(&self) -> Option<SourceKind> {
        SourceKind::parse(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_parses_aliases() {
        assert_eq!(SourceKind::parse("google_trends"), Some(SourceKind::GoogleTrends));
        assert_eq!(SourceKind::parse("Google-Trends"), Some(SourceKind::GoogleTrends));
        assert_eq!(SourceKind::parse("hacker_news"), Some(SourceKind::Hackernews));
        assert_eq!(SourceKind::parse("hn"), Some(SourceKind::Hackernews));
        assert_eq!(SourceKind::parse("x"), Some(SourceKind::Twitter));
        assert_eq!(SourceKind::parse("myspace"), None);
    }

    #[test]
    fn commerce_and_social_platforms_parse_by_name() {
        // Source names carried over from older configs keep resolving
        assert_eq!(SourceKind::parse("pinterest"), Some(SourceKind::Pinterest));
        assert_eq!(SourceKind::parse("linked_in"), Some(SourceKind::Linkedin));
        assert_eq!(SourceKind::parse("Amazon"), Some(SourceKind::Amazon));
        assert_eq!(SourceKind::parse("ebay"), Some(SourceKind::Ebay));
        assert_eq!(SourceKind::parse("otto"), Some(SourceKind::Otto));
    }

    #[test]
    fn scrape_method_accepts_legacy_alias() {
        let method: ScrapeMethod = serde_yaml::from_str("lightweight-request").unwrap();
        assert_eq!(method, ScrapeMethod::Request);
    }

    #[test]
    fn record_serializes_without_empty_optionals() {
        let record = TrendRecord::new(
            "espresso",
            SourceKind::Twitter,
            serde_json::json!([]),
            ExtractionStrategy::Simulated,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("screenshot").is_none());
        assert_eq!(json["strategy"], "simulated");
    }
}
