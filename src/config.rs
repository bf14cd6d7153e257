//! Configuration management: YAML settings with niche definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{EngineKind, SourceConfig};

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    /// Named keyword categories and the sources to scrape them from.
    #[serde(default)]
    pub niches: BTreeMap<String, NicheConfig>,
}

impl Settings {
    /// Load settings from an explicit path, or the default location.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let raw = fs::read_to_string(path)
            .with_context(|| format!("config file not found: {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    pub fn niche(&self, category: &str) -> Option<&NicheConfig> {
        self.niches.get(category)
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory holding one session blob per service.
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
    /// Directory diagnostic screenshots are written to.
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
    /// SQLite database for scraped trends and source definitions.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            screenshot_dir: default_screenshot_dir(),
            database: default_database(),
        }
    }
}

fn default_session_dir() -> PathBuf {
    PathBuf::from("browser_sessions")
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_database() -> PathBuf {
    PathBuf::from("keyword_trends.db")
}

/// Browser engine and navigation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default)]
    pub engine: EngineKind,

    /// Run headless. Defaults to false: login flows need a window a human
    /// can type into.
    #[serde(default)]
    pub headless: bool,

    /// Bound on navigation readiness waits, in seconds.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Bound on the human login flow, in seconds.
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    #[serde(default)]
    pub pacing: PacingSettings,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            headless: false,
            navigation_timeout_secs: default_navigation_timeout(),
            login_timeout_secs: default_login_timeout(),
            chrome_args: Vec::new(),
            pacing: PacingSettings::default(),
        }
    }
}

fn default_navigation_timeout() -> u64 {
    60
}

fn default_login_timeout() -> u64 {
    300
}

/// Jitter bounds for human-like pacing. Each pair is `[min, max]` and is
/// sampled uniformly; this is anti-detection timing, not business logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSettings {
    /// Delay before each navigation, milliseconds.
    #[serde(default = "default_pre_navigation_ms")]
    pub pre_navigation_ms: [u64; 2],
    /// Delay after the document becomes ready, milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: [u64; 2],
    /// Random scroll offset after load, pixels.
    #[serde(default = "default_scroll_px")]
    pub scroll_px: [u64; 2],
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            pre_navigation_ms: default_pre_navigation_ms(),
            settle_ms: default_settle_ms(),
            scroll_px: default_scroll_px(),
        }
    }
}

fn default_pre_navigation_ms() -> [u64; 2] {
    [1000, 3000]
}

fn default_settle_ms() -> [u64; 2] {
    [2000, 5000]
}

fn default_scroll_px() -> [u64; 2] {
    [120, 500]
}

/// One keyword category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicheConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

impl NicheConfig {
    pub fn source_configs(&self) -> Vec<SourceConfig> {
        self.sources.iter().map(SourceEntry::to_config).collect()
    }
}

/// A source entry - either a bare platform name or a detailed definition.
///
/// Examples:
/// - `"twitter"` - platform name, browser-automation method
/// - `{ name: hackernews, scrape_method: request }` - detailed form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Name(String),
    Detailed(SourceConfig),
}

impl SourceEntry {
    pub fn to_config(&self) -> SourceConfig {
        match self {
            Self::Name(name) => SourceConfig::named(name),
            Self::Detailed(config) => config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScrapeMethod;

    #[test]
    fn parses_bare_and_detailed_source_entries() {
        let yaml = r#"
niches:
  coffee:
    keywords: ["espresso", "cold brew"]
    sources:
      - twitter
      - name: hackernews
        scrape_method: request
      - name: news
        scrape_method: simulated
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        let niche = settings.niche("coffee").unwrap();
        assert_eq!(niche.keywords.len(), 2);

        let sources = niche.source_configs();
        assert_eq!(sources[0].name, "twitter");
        assert_eq!(sources[0].scrape_method, ScrapeMethod::BrowserAutomation);
        assert_eq!(sources[1].scrape_method, ScrapeMethod::Request);
        assert_eq!(sources[2].scrape_method, ScrapeMethod::Simulated);
    }

    #[test]
    fn defaults_apply_when_sections_missing() {
        let settings: Settings = serde_yaml::from_str("niches: {}").unwrap();
        assert_eq!(settings.paths.session_dir, PathBuf::from("browser_sessions"));
        assert_eq!(settings.browser.navigation_timeout_secs, 60);
        assert_eq!(settings.browser.login_timeout_secs, 300);
        assert!(!settings.browser.headless);
        assert_eq!(settings.browser.pacing.pre_navigation_ms, [1000, 3000]);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
