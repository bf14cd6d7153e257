//! Isolated scraping contexts: a dedicated incognito browser context with
//! its own cookie jar, holding one fresh stealth-patched page that is
//! optionally primed with a stored session's cookies.

use std::path::{Path, PathBuf};

use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetUserAgentOverrideParams};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::Page;
use tracing::{debug, warn};

use super::navigate;
use super::session::{SessionCookie, SessionStore};
use super::stealth;
use super::EngineHandle;
use crate::error::{Result, ScrapeError};

/// One scraping context. Contexts never outlive a single operation; the
/// engine they were opened from does. Each context lives in its own
/// incognito browser context, so cookies replayed for one session never
/// leak into another context opened on the same engine.
pub struct SessionContext {
    engine: EngineHandle,
    page: Page,
    context_id: BrowserContextId,
    session: Option<String>,
}

impl SessionContext {
    /// Open an isolated context on the shared engine.
    ///
    /// The stealth patches and user agent override always apply. When a
    /// session name is given and a saved session exists, its cookies are
    /// replayed into the context; a missing session opens the context
    /// stateless, while an unreadable one is logged and skipped.
    pub async fn open(
        engine: &EngineHandle,
        store: &SessionStore,
        session: Option<&str>,
    ) -> Result<Self> {
        let (page, context_id) = {
            let mut browser = engine.lock().await;
            let context_id = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(|err| {
                    ScrapeError::Context(format!("could not create browser context: {err}"))
                })?;

            let target = match CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context_id.clone())
                .build()
            {
                Ok(target) => target,
                Err(reason) => {
                    let _ = browser.dispose_browser_context(context_id).await;
                    return Err(ScrapeError::Context(reason));
                }
            };

            match browser.new_page(target).await {
                Ok(page) => (page, context_id),
                Err(err) => {
                    let _ = browser.dispose_browser_context(context_id).await;
                    return Err(ScrapeError::Context(format!("could not open page: {err}")));
                }
            }
        };

        if let Err(err) = prepare(&page, store, session).await {
            let _ = page.close().await;
            let mut browser = engine.lock().await;
            let _ = browser.dispose_browser_context(context_id).await;
            return Err(err);
        }

        Ok(Self {
            engine: engine.clone(),
            page,
            context_id,
            session: session.map(String::from),
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Identifier of the dedicated browser context backing this session.
    pub fn context_id(&self) -> &BrowserContextId {
        &self.context_id
    }

    /// Snapshot the cookies currently held by this context, in storable form.
    pub async fn current_cookies(&self) -> Vec<SessionCookie> {
        self.page
            .get_cookies()
            .await
            .unwrap_or_default()
            .iter()
            .map(|c| SessionCookie {
                name: c.name.clone(),
                value: c.value.clone(),
                domain: c.domain.clone(),
                path: c.path.clone(),
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect()
    }

    /// Full-page screenshot for diagnostics. Failures are logged, never
    /// propagated.
    pub async fn save_screenshot(&self, dir: &Path, name: &str) -> Option<PathBuf> {
        navigate::capture(&self.page, dir, name).await
    }

    /// Close the page and dispose this context's cookie jar. The engine
    /// stays up.
    pub async fn close(self) {
        let _ = self.page.close().await;
        let mut browser = self.engine.lock().await;
        if let Err(err) = browser.dispose_browser_context(self.context_id).await {
            debug!("browser context disposal failed: {err}");
        }
    }
}

/// Stealth patches, user agent override, and optional session replay.
async fn prepare(page: &Page, store: &SessionStore, session: Option<&str>) -> Result<()> {
    page.execute(SetUserAgentOverrideParams::new(
        stealth::USER_AGENT.to_string(),
    ))
    .await
    .map_err(|err| ScrapeError::Context(format!("user agent override failed: {err}")))?;

    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(
        stealth::INIT_SCRIPT.to_string(),
    ))
    .await
    .map_err(|err| ScrapeError::Context(format!("stealth install failed: {err}")))?;

    if let Some(name) = session {
        match store.load(name) {
            Ok(Some(cookies)) => {
                debug!("priming context with session '{name}'");
                apply_cookies(page, &cookies).await;
            }
            Ok(None) => {
                debug!("no saved session '{name}', opening stateless context");
            }
            Err(err) => {
                warn!("session '{name}' unusable, continuing stateless: {err}");
            }
        }
    }
    Ok(())
}

async fn apply_cookies(page: &Page, cookies: &[SessionCookie]) {
    for cookie in cookies {
        if cookie.name.is_empty() || cookie.domain.is_empty() {
            continue;
        }

        let param = CookieParam::builder()
            .name(&cookie.name)
            .value(&cookie.value)
            .domain(&cookie.domain)
            .build();

        match param {
            Ok(param) => {
                if let Err(err) = page.set_cookie(param).await {
                    warn!("failed to set cookie {}: {err}", cookie.name);
                }
            }
            Err(err) => {
                warn!("failed to build cookie {}: {err}", cookie.name);
            }
        }
    }
}
