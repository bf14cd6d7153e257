//! Navigation with human pacing.
//!
//! Every page load follows the same shape: a randomized pre-navigation
//! pause, the load itself, a settle delay, a small scroll, then a poll for
//! the marker selector that proves the content actually rendered. A marker
//! that never shows up is reported, not fatal - callers decide whether to
//! fall through to another extraction strategy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::PacingSettings;
use crate::error::{Result, ScrapeError};

const MARKER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How a navigation ended. `MarkerTimeout` means the page loaded but the
/// expected content marker never appeared within the deadline.
#[derive(Debug)]
pub enum NavOutcome {
    Ready,
    MarkerTimeout {
        screenshot: Option<PathBuf>,
        reason: String,
    },
}

pub struct Navigator {
    pacing: PacingSettings,
    timeout: Duration,
    screenshot_dir: PathBuf,
}

impl Navigator {
    pub fn new(pacing: PacingSettings, timeout: Duration, screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            pacing,
            timeout,
            screenshot_dir: screenshot_dir.into(),
        }
    }

    /// Load `url` and wait for `marker` to appear.
    ///
    /// Hard load failures capture a diagnostic screenshot and return an
    /// error. A missing marker is `Ok(MarkerTimeout)` so the caller can
    /// still try weaker extraction strategies against whatever rendered.
    pub async fn navigate(
        &self,
        page: &Page,
        url: &str,
        marker: Option<&str>,
        shot_name: &str,
    ) -> Result<NavOutcome> {
        let [pre_min, pre_max] = self.pacing.pre_navigation_ms;
        let pre_delay = rand::rng().random_range(pre_min..=pre_max.max(pre_min));
        debug!("pacing {pre_delay}ms before {url}");
        tokio::time::sleep(Duration::from_millis(pre_delay)).await;

        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|reason| ScrapeError::Navigation {
                url: url.to_string(),
                reason,
            })?;

        if let Err(err) = page.execute(nav_params).await {
            let _ = capture(page, &self.screenshot_dir, shot_name).await;
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            });
        }

        self.wait_for_ready(page).await;

        let [settle_min, settle_max] = self.pacing.settle_ms;
        let settle = rand::rng().random_range(settle_min..=settle_max.max(settle_min));
        tokio::time::sleep(Duration::from_millis(settle)).await;

        // A small scroll triggers lazy-loaded widgets
        let [px_min, px_max] = self.pacing.scroll_px;
        let px = rand::rng().random_range(px_min..=px_max.max(px_min));
        if let Err(err) = page
            .evaluate(format!("window.scrollBy(0, {px})"))
            .await
        {
            debug!("scroll skipped: {err}");
        }

        let Some(selector) = marker else {
            return Ok(NavOutcome::Ready);
        };

        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if page.find_element(selector).await.is_ok() {
                debug!("marker '{selector}' present");
                return Ok(NavOutcome::Ready);
            }
            if tokio::time::Instant::now() >= deadline {
                let reason = ScrapeError::MarkerTimeout {
                    selector: selector.to_string(),
                    waited_ms: self.timeout.as_millis() as u64,
                }
                .to_string();
                warn!("{reason} on {url}");
                let screenshot = capture(page, &self.screenshot_dir, shot_name).await;
                return Ok(NavOutcome::MarkerTimeout { screenshot, reason });
            }
            tokio::time::sleep(MARKER_POLL_INTERVAL).await;
        }
    }

    /// Wait on `document.readyState` instead of a fixed delay. Best effort;
    /// non-HTML responses and slow documents just log.
    async fn wait_for_ready(&self, page: &Page) {
        let ready_script = r#"
            new Promise((resolve) => {
                if (document.readyState === 'complete' || document.readyState === 'interactive') {
                    resolve(document.readyState);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
                    setTimeout(() => resolve('timeout'), 10000);
                }
            })
        "#;

        match tokio::time::timeout(self.timeout, page.evaluate(ready_script.to_string())).await {
            Ok(Ok(result)) => {
                let state: String = result.into_value().unwrap_or_else(|_| "unknown".to_string());
                debug!("page ready state: {state}");
            }
            Ok(Err(err)) => {
                debug!("could not check ready state (possibly non-HTML page): {err}");
            }
            Err(_) => {
                warn!("timeout waiting for page ready state");
            }
        }
    }
}

/// Full-page screenshot of the current state, written under `dir` with a
/// timestamped name. Failures log and yield `None`.
pub(crate) async fn capture(page: &Page, dir: &Path, name: &str) -> Option<PathBuf> {
    if let Err(err) = tokio::fs::create_dir_all(dir).await {
        warn!("could not create screenshot dir {}: {err}", dir.display());
        return None;
    }

    let params = ScreenshotParams::builder().full_page(true).build();
    let bytes = match page.screenshot(params).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("screenshot failed: {err}");
            return None;
        }
    };

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{name}_{stamp}.png"));
    match tokio::fs::write(&path, bytes).await {
        Ok(()) => {
            debug!("saved screenshot {}", path.display());
            Some(path)
        }
        Err(err) => {
            warn!("could not write screenshot {}: {err}", path.display());
            None
        }
    }
}
