//! Engine and context lifecycle against a real browser.
//!
//! These launch an actual Chromium, so they are ignored by default; run
//! them with `cargo test -- --ignored` on a machine with a local install.

#![cfg(feature = "browser")]

use std::sync::Arc;

use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::cdp::browser_protocol::storage::GetCookiesParams;

use trendacquire::browser::{BrowserRegistry, SessionContext, SessionStore};
use trendacquire::config::BrowserSettings;
use trendacquire::models::EngineKind;

fn settings() -> BrowserSettings {
    BrowserSettings {
        headless: true,
        ..BrowserSettings::default()
    }
}

#[tokio::test]
#[ignore = "needs a local Chromium install"]
async fn repeated_acquire_reuses_the_running_engine() {
    let registry = BrowserRegistry::new(&settings());

    let first = registry.acquire(EngineKind::Chromium).await.expect("launch");
    // A second acquire, even for another kind, must not launch again
    let second = registry.acquire(EngineKind::Edge).await.expect("reuse");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.running_kind().await, Some(EngineKind::Chromium));

    registry.shutdown().await.expect("shutdown");
}

#[tokio::test]
#[ignore = "needs a local Chromium install"]
async fn closing_one_context_leaves_the_other_navigable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path());
    let registry = BrowserRegistry::new(&settings());
    let handle = registry.acquire(EngineKind::Chromium).await.expect("launch");

    let first = SessionContext::open(&handle, &store, None)
        .await
        .expect("first context");
    let second = SessionContext::open(&handle, &store, None)
        .await
        .expect("second context");

    first.close().await;

    second
        .page()
        .evaluate("1 + 1".to_string())
        .await
        .expect("surviving context still evaluates");

    second.close().await;
    registry.shutdown().await.expect("shutdown");
}

#[tokio::test]
#[ignore = "needs a local Chromium install"]
async fn contexts_do_not_share_cookie_jars() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path());
    let registry = BrowserRegistry::new(&settings());
    let handle = registry.acquire(EngineKind::Chromium).await.expect("launch");

    let first = SessionContext::open(&handle, &store, None)
        .await
        .expect("first context");
    let second = SessionContext::open(&handle, &store, None)
        .await
        .expect("second context");

    let cookie = CookieParam::builder()
        .name("auth_token")
        .value("first-only")
        .domain(".example.com")
        .build()
        .expect("cookie");
    first.page().set_cookie(cookie).await.expect("set cookie");

    let jar = |ctx: &SessionContext| GetCookiesParams {
        browser_context_id: Some(ctx.context_id().clone()),
    };
    let browser = handle.lock().await;
    let first_jar = browser.execute(jar(&first)).await.expect("first jar");
    let second_jar = browser.execute(jar(&second)).await.expect("second jar");
    drop(browser);

    assert!(first_jar.result.cookies.iter().any(|c| c.name == "auth_token"));
    assert!(second_jar.result.cookies.is_empty());

    first.close().await;
    second.close().await;
    registry.shutdown().await.expect("shutdown");
}
