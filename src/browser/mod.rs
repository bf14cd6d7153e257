//! Hybrid browser-automation orchestrator.
//!
//! One shared engine per process, lazily launched through the registry and
//! reused by every scraping operation. Each operation opens its own
//! short-lived context (a stealth-patched page, optionally primed with a
//! stored session), drives it through the navigation layer with human
//! pacing, and closes it when done - the engine stays up until an explicit
//! shutdown.

mod session;

pub use session::{SessionCookie, SessionStore};

#[cfg(feature = "browser")]
mod context;
#[cfg(feature = "browser")]
mod login;
#[cfg(feature = "browser")]
mod navigate;
#[cfg(feature = "browser")]
mod stealth;

#[cfg(feature = "browser")]
pub use context::SessionContext;
#[cfg(feature = "browser")]
pub use login::{wait_for_login, LoginSpec};
#[cfg(feature = "browser")]
pub use navigate::{NavOutcome, Navigator};

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::sync::Arc;

#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tracing::{info, warn};

#[cfg(feature = "browser")]
use crate::config::BrowserSettings;
#[cfg(feature = "browser")]
use crate::error::{Result, ScrapeError};
#[cfg(feature = "browser")]
use crate::models::EngineKind;

/// Shared handle to the running engine.
#[cfg(feature = "browser")]
pub type EngineHandle = Arc<Mutex<Browser>>;

/// Engine lifecycle. Launch happens while the registry lock is held, so
/// concurrent first-time acquisitions cannot race a second engine into
/// existence.
#[cfg(feature = "browser")]
enum EngineState {
    Uninitialized,
    Ready {
        kind: EngineKind,
        handle: EngineHandle,
    },
    Closed,
}

/// Process-wide owner of the single browser engine.
///
/// `acquire` is idempotent while the engine is `Ready`; a launch failure
/// falls back once to the default kind, and any failure resets the state so
/// later calls can retry cleanly.
#[cfg(feature = "browser")]
pub struct BrowserRegistry {
    headless: bool,
    extra_args: Vec<String>,
    state: Mutex<EngineState>,
}

#[cfg(feature = "browser")]
impl BrowserRegistry {
    pub fn new(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
            extra_args: settings.chrome_args.clone(),
            state: Mutex::new(EngineState::Uninitialized),
        }
    }

    /// Get the shared engine, launching it on first use.
    ///
    /// Repeated calls while `Ready` return the same handle regardless of the
    /// requested kind. A closed registry may be relaunched.
    pub async fn acquire(&self, kind: EngineKind) -> Result<EngineHandle> {
        let mut state = self.state.lock().await;

        if let EngineState::Ready { handle, .. } = &*state {
            return Ok(handle.clone());
        }

        match self.launch(kind).await {
            Ok(handle) => {
                *state = EngineState::Ready {
                    kind,
                    handle: handle.clone(),
                };
                Ok(handle)
            }
            Err(first) if kind != EngineKind::default() => {
                warn!(
                    "{} failed to launch ({first}); falling back to {}",
                    kind,
                    EngineKind::default()
                );
                match self.launch(EngineKind::default()).await {
                    Ok(handle) => {
                        *state = EngineState::Ready {
                            kind: EngineKind::default(),
                            handle: handle.clone(),
                        };
                        Ok(handle)
                    }
                    Err(err) => {
                        *state = EngineState::Uninitialized;
                        Err(err)
                    }
                }
            }
            Err(first) => {
                *state = EngineState::Uninitialized;
                Err(first)
            }
        }
    }

    /// The engine kind currently running, if any.
    pub async fn running_kind(&self) -> Option<EngineKind> {
        match &*self.state.lock().await {
            EngineState::Ready { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Tear down the engine and everything it owns. No-op when nothing is
    /// running or the registry is already closed.
    pub async fn shutdown(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if let EngineState::Ready { kind, handle } =
            std::mem::replace(&mut *state, EngineState::Closed)
        {
            info!("shutting down {kind} engine");
            let mut browser = handle.lock().await;
            if let Err(err) = browser.close().await {
                warn!("engine did not close cleanly: {err}");
            }
        }
        Ok(())
    }

    async fn launch(&self, kind: EngineKind) -> Result<EngineHandle> {
        let executable = find_executable(kind).ok_or_else(|| ScrapeError::BrowserLaunch {
            kind,
            reason: format!("no {kind} executable found on this system"),
        })?;

        info!(
            "launching {kind} engine (headless={}) from {}",
            self.headless,
            executable.display()
        );

        let mut builder = BrowserConfig::builder().chrome_executable(executable);

        // with_head means NOT headless, confusingly
        if !self.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer")
            .arg("--window-size=1280,800");

        for arg in &self.extra_args {
            builder = builder.arg(arg.as_str());
        }

        let config = builder.build().map_err(|reason| ScrapeError::BrowserLaunch {
            kind,
            reason,
        })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|err| ScrapeError::BrowserLaunch {
                    kind,
                    reason: err.to_string(),
                })?;

        // Drain CDP events for the lifetime of the engine
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Arc::new(Mutex::new(browser)))
    }
}

/// Well-known executable locations per engine kind.
#[cfg(feature = "browser")]
fn executable_candidates(kind: EngineKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        EngineKind::Chromium => (
            &[
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ],
            &["chromium", "chromium-browser"],
        ),
        EngineKind::Chrome => (
            &[
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/opt/google/chrome/google-chrome",
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            ],
            &["google-chrome", "google-chrome-stable"],
        ),
        EngineKind::Edge => (
            &[
                "/usr/bin/microsoft-edge",
                "/usr/bin/microsoft-edge-stable",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            ],
            &["microsoft-edge", "microsoft-edge-stable"],
        ),
    }
}

#[cfg(feature = "browser")]
fn find_executable(kind: EngineKind) -> Option<PathBuf> {
    let (paths, commands) = executable_candidates(kind);

    for path in paths {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    // Check PATH via `which`
    for cmd in commands {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }

    None
}

#[cfg(all(test, feature = "browser"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_without_engine_is_a_noop() {
        let registry = BrowserRegistry::new(&BrowserSettings::default());
        registry.shutdown().await.unwrap();
        // Safe to call again when already closed
        registry.shutdown().await.unwrap();
        assert_eq!(registry.running_kind().await, None);
    }

    #[tokio::test]
    async fn nothing_runs_before_first_acquire() {
        let registry = BrowserRegistry::new(&BrowserSettings::default());
        assert_eq!(registry.running_kind().await, None);
    }
}
