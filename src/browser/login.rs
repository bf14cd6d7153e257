//! Interactive login flow. The human completes the login in the visible
//! browser window; we just open the right page and watch for the marker
//! that proves it worked.

use std::time::Duration;

use console::style;
use tracing::{info, warn};

use super::context::SessionContext;
use super::navigate::Navigator;
use crate::error::Result;

const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Where to send the user for a given service and how to tell the login
/// stuck.
#[derive(Debug, Clone)]
pub struct LoginSpec {
    pub service: String,
    pub url: String,
    pub success_marker: String,
}

impl LoginSpec {
    pub fn for_service(name: &str) -> Option<Self> {
        match name {
            "twitter" | "x" => Some(Self {
                service: "twitter".to_string(),
                url: "https://twitter.com/login".to_string(),
                success_marker: "[data-testid='primaryColumn']".to_string(),
            }),
            "google" => Some(Self {
                service: "google".to_string(),
                url: "https://accounts.google.com".to_string(),
                success_marker: "[data-alternative-action]".to_string(),
            }),
            _ => None,
        }
    }
}

/// Open the login page and wait for the user to finish.
///
/// Returns `Ok(true)` once the success marker appears, `Ok(false)` when the
/// deadline passes without it. There is no retry; the caller reports the
/// timeout and the user runs the command again.
pub async fn wait_for_login(
    ctx: &SessionContext,
    navigator: &Navigator,
    spec: &LoginSpec,
    timeout: Duration,
) -> Result<bool> {
    println!(
        "{}",
        style(format!(
            "Complete the {} login in the browser window. Waiting up to {}s...",
            spec.service,
            timeout.as_secs()
        ))
        .cyan()
        .bold()
    );

    // No marker here: the login page itself has none of the logged-in markup
    navigator
        .navigate(ctx.page(), &spec.url, None, &format!("{}_login", spec.service))
        .await?;

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if ctx.page().find_element(&spec.success_marker).await.is_ok() {
            info!("login to {} confirmed", spec.service);
            return Ok(true);
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(
                "login to {} not confirmed within {}s",
                spec.service,
                timeout.as_secs()
            );
            return Ok(false);
        }
        tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_services_have_specs() {
        let twitter = LoginSpec::for_service("twitter").unwrap();
        assert_eq!(twitter.service, "twitter");
        assert!(twitter.url.contains("login"));

        // "x" is an alias for twitter
        assert_eq!(LoginSpec::for_service("x").unwrap().service, "twitter");

        assert!(LoginSpec::for_service("google").is_some());
        assert!(LoginSpec::for_service("myspace").is_none());
    }
}
