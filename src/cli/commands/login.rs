//! `login` - interactive login and session capture.

use crate::config::Settings;
use crate::models::EngineKind;

#[cfg(feature = "browser")]
pub async fn cmd_login(
    settings: &Settings,
    service: &str,
    engine: Option<EngineKind>,
) -> anyhow::Result<()> {
    use std::time::Duration;

    use anyhow::Context;
    use console::style;

    use crate::browser::{
        wait_for_login, BrowserRegistry, LoginSpec, Navigator, SessionContext, SessionStore,
    };
    use crate::error::ScrapeError;

    let spec = LoginSpec::for_service(service)
        .with_context(|| format!("no login flow defined for '{service}'"))?;

    if settings.browser.headless {
        tracing::warn!("headless engine configured; the login window will not be visible");
    }

    let registry = BrowserRegistry::new(&settings.browser);
    let engine_kind = engine.unwrap_or(settings.browser.engine);
    let handle = registry.acquire(engine_kind).await?;

    let store = SessionStore::new(&settings.paths.session_dir);
    let ctx = SessionContext::open(&handle, &store, None).await?;
    let navigator = Navigator::new(
        settings.browser.pacing.clone(),
        Duration::from_secs(settings.browser.navigation_timeout_secs),
        &settings.paths.screenshot_dir,
    );

    let timeout = Duration::from_secs(settings.browser.login_timeout_secs);
    let confirmed = wait_for_login(&ctx, &navigator, &spec, timeout).await?;

    if confirmed {
        let cookies = ctx.current_cookies().await;
        let path = store.save(&spec.service, &cookies)?;
        println!(
            "{} session '{}' saved to {} ({} cookies)",
            style("✓").green().bold(),
            spec.service,
            path.display(),
            cookies.len()
        );
    }

    ctx.close().await;
    registry.shutdown().await?;

    if confirmed {
        Ok(())
    } else {
        Err(ScrapeError::LoginTimeout {
            seconds: timeout.as_secs(),
        }
        .into())
    }
}

#[cfg(not(feature = "browser"))]
pub async fn cmd_login(
    _settings: &Settings,
    _service: &str,
    _engine: Option<EngineKind>,
) -> anyhow::Result<()> {
    anyhow::bail!("browser support not compiled in; rebuild with the 'browser' feature")
}
