//! Browser-automation scrapers sharing the process-wide engine.
//!
//! Named after the hybrid model they implement: live pages where the
//! platform cooperates, deterministic simulation where it does not, with
//! the session and engine shared across all of them.

mod google_trends;
mod twitter;

pub use google_trends::GoogleTrendsScraper;
pub use twitter::TwitterScraper;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::{BrowserRegistry, Navigator, SessionContext, SessionStore};
use crate::error::Result;
use crate::models::{EngineKind, SourceConfig, SourceKind};

use super::ScrapeDeps;

/// Everything a hybrid scraper needs besides its platform specifics.
pub(crate) struct HybridCore {
    registry: Arc<BrowserRegistry>,
    store: SessionStore,
    navigator: Navigator,
    engine: EngineKind,
    screenshot_dir: PathBuf,
    session: Option<String>,
    wait_selector: Option<String>,
}

impl HybridCore {
    pub(crate) fn new(config: &SourceConfig, deps: &ScrapeDeps, kind: SourceKind) -> Self {
        let browser = &deps.settings.browser;
        let paths = &deps.settings.paths;

        let session = config
            .session
            .clone()
            .or_else(|| kind.default_session().map(String::from));

        Self {
            registry: deps.registry.clone(),
            store: SessionStore::new(&paths.session_dir),
            navigator: Navigator::new(
                browser.pacing.clone(),
                Duration::from_secs(browser.navigation_timeout_secs),
                &paths.screenshot_dir,
            ),
            engine: deps.engine,
            screenshot_dir: paths.screenshot_dir.clone(),
            session,
            wait_selector: config.wait_selector.clone(),
        }
    }

    /// Acquire the shared engine and open a context primed with this
    /// scraper's session.
    pub(crate) async fn open_context(&self) -> Result<SessionContext> {
        let engine = self.registry.acquire(self.engine).await?;
        SessionContext::open(&engine, &self.store, self.session.as_deref()).await
    }

    pub(crate) fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub(crate) fn screenshot_dir(&self) -> &PathBuf {
        &self.screenshot_dir
    }

    /// Marker selector to wait for, with a platform default.
    pub(crate) fn marker<'a>(&'a self, default: &'a str) -> &'a str {
        self.wait_selector.as_deref().unwrap_or(default)
    }
}

/// Screenshot base name for one (source, keyword) attempt.
pub(crate) fn shot_name(kind: SourceKind, keyword: &str) -> String {
    format!("{}_{}", kind.as_str(), keyword.replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_names_are_filesystem_safe() {
        assert_eq!(
            shot_name(SourceKind::GoogleTrends, "espresso machine"),
            "google_trends_espresso_machine"
        );
    }
}
