//! Error taxonomy for the scraping core.
//!
//! Only browser launch is fatal (and only after one fallback engine kind has
//! been tried). Everything else is contained: navigation marker timeouts
//! degrade to extraction on whatever state the page reached, extraction
//! misses advance the strategy chain, and session load failures fall back to
//! a stateless context.

use thiserror::Error;

use crate::models::EngineKind;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The requested engine kind (and the fallback default) failed to launch.
    #[error("failed to launch {kind} engine: {reason}")]
    BrowserLaunch { kind: EngineKind, reason: String },

    /// Engine or network level navigation failure.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The readiness marker never became visible. Non-fatal: extraction is
    /// still attempted against the partial page.
    #[error("readiness marker `{selector}` not visible within {waited_ms}ms")]
    MarkerTimeout { selector: String, waited_ms: u64 },

    /// A stored session blob exists but could not be read or parsed.
    #[error("session `{name}` could not be loaded: {reason}")]
    SessionLoad { name: String, reason: String },

    /// The human did not complete the login flow in time. Reported, never
    /// retried automatically.
    #[error("login not completed within {seconds}s")]
    LoginTimeout { seconds: u64 },

    /// Page setup (context/page creation, script injection) failed.
    #[error("browser context error: {0}")]
    Context(String),

    /// A strategy produced no usable data. Advances the fallback chain.
    #[error("extraction miss: {0}")]
    Extraction(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
