//! `scrape` - run a category's keywords through its configured sources.

use std::path::Path;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Settings;
use crate::models::{EngineKind, ExtractionStrategy, SourceConfig, TrendRecord};
use crate::output::OutputManager;
use crate::scrapers::{self, ScrapeDeps};
use crate::store::TrendStore;

pub async fn cmd_scrape(
    settings: &Settings,
    category: &str,
    output: Option<&Path>,
    limit: usize,
    engine: Option<EngineKind>,
) -> anyhow::Result<()> {
    let niche = settings
        .niche(category)
        .with_context(|| format!("category '{category}' not found in config"))?;
    if niche.keywords.is_empty() {
        anyhow::bail!("category '{category}' has no keywords");
    }

    let mut sources = niche.source_configs();
    if sources.is_empty() {
        // Default hybrid pair, matching the common config
        sources = vec![
            SourceConfig::named("google_trends"),
            SourceConfig::named("twitter"),
        ];
    }

    #[cfg(feature = "browser")]
    let deps = ScrapeDeps::new(settings.clone(), engine.unwrap_or(settings.browser.engine));
    #[cfg(not(feature = "browser"))]
    let deps = {
        let _ = engine;
        ScrapeDeps::new(settings.clone())
    };

    // The engine is torn down on every exit path, including errors below
    let result = run_scrape(settings, &deps, category, &sources, &niche.keywords, output, limit).await;
    #[cfg(feature = "browser")]
    if let Err(err) = deps.registry.shutdown().await {
        tracing::warn!("engine shutdown failed: {err}");
    }
    result
}

async fn run_scrape(
    settings: &Settings,
    deps: &ScrapeDeps,
    category: &str,
    sources: &[SourceConfig],
    keywords: &[String],
    output: Option<&Path>,
    limit: usize,
) -> anyhow::Result<()> {
    #[cfg(feature = "browser")]
    ensure_sessions(settings, deps, sources).await;

    let store = TrendStore::open(&settings.paths.database)?;

    let total = (sources.len() * keywords.len()) as u64;
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut all_records: Vec<TrendRecord> = Vec::new();
    for source in sources {
        progress.set_message(source.name.clone());
        info!("scraping {} keywords from '{}'", keywords.len(), source.name);

        let mut scraper = scrapers::resolve(source, deps);
        let records = scraper.scrape(keywords, limit).await;

        for record in &records {
            if let Err(err) = store.save_record(category, record) {
                progress.finish_and_clear();
                return Err(err);
            }
            progress.inc(1);
        }
        all_records.extend(records);
    }
    progress.finish_and_clear();

    summarize(category, &all_records);

    if let Some(path) = output {
        OutputManager::save_to_file(&all_records, path)?;
    }
    Ok(())
}

/// Open the login flow for browser sources whose session is missing. A
/// failed or timed-out login is reported and the scrape continues
/// stateless.
#[cfg(feature = "browser")]
async fn ensure_sessions(settings: &Settings, deps: &ScrapeDeps, sources: &[SourceConfig]) {
    use std::time::Duration;

    use crate::browser::{wait_for_login, LoginSpec, Navigator, SessionContext, SessionStore};
    use crate::models::ScrapeMethod;
    use tracing::warn;

    let store = SessionStore::new(&settings.paths.session_dir);

    for source in sources {
        if source.scrape_method != ScrapeMethod::BrowserAutomation {
            continue;
        }
        let Some(session) = source
            .session
            .clone()
            .or_else(|| source.kind().and_then(|k| k.default_session().map(String::from)))
        else {
            continue;
        };
        if store.exists(&session) {
            continue;
        }
        let Some(spec) = LoginSpec::for_service(&session) else {
            continue;
        };

        info!("no saved session '{session}', starting login flow");
        let flow = async {
            let handle = deps.registry.acquire(deps.engine).await?;
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
                store.save(&spec.service, &cookies)?;
            }
            ctx.close().await;
            Ok::<bool, crate::error::ScrapeError>(confirmed)
        };

        match flow.await {
            Ok(true) => info!("session '{session}' captured"),
            Ok(false) => warn!("login for '{session}' not completed; scraping stateless"),
            Err(err) => warn!("login flow for '{session}' failed: {err}; scraping stateless"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScrapeMethod;

    fn deps(settings: &Settings) -> ScrapeDeps {
        #[cfg(feature = "browser")]
        return ScrapeDeps::new(settings.clone(), EngineKind::default());
        #[cfg(not(feature = "browser"))]
        return ScrapeDeps::new(settings.clone());
    }

    #[tokio::test]
    async fn persistence_failure_still_reaches_engine_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        // A directory at the database path makes every store operation fail
        let db_path = dir.path().join("trends.db");
        std::fs::create_dir_all(&db_path).unwrap();
        settings.paths.database = db_path;

        let deps = deps(&settings);
        let sources = vec![SourceConfig {
            name: "news".to_string(),
            scrape_method: ScrapeMethod::Simulated,
            session: None,
            wait_selector: None,
        }];
        let keywords = vec!["espresso".to_string()];

        let result = run_scrape(&settings, &deps, "coffee", &sources, &keywords, None, 3).await;
        assert!(result.is_err());

        // The error surfaced without consuming deps, so the caller can still
        // tear the registry down cleanly afterwards
        #[cfg(feature = "browser")]
        {
            assert_eq!(deps.registry.running_kind().await, None);
            deps.registry.shutdown().await.unwrap();
        }
    }
}

fn summarize(category: &str, records: &[TrendRecord]) {
    let simulated = records
        .iter()
        .filter(|r| r.strategy == ExtractionStrategy::Simulated)
        .count();
    let live = records.len() - simulated;

    println!(
        "{} scraped '{category}': {} records ({live} live, {simulated} simulated)",
        style("✓").green().bold(),
        records.len()
    );

    for record in records.iter().filter(|r| r.error.is_some()) {
        if let Some(error) = &record.error {
            println!(
                "  {} {}/{}: {error}",
                style("!").yellow(),
                record.source,
                record.keyword
            );
        }
        if let Some(shot) = &record.screenshot {
            println!("    screenshot: {}", shot.display());
        }
    }
}
