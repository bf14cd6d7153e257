//! `source` - manage the registered data sources.

use console::style;

use crate::config::Settings;
use crate::models::{ScrapeMethod, SourceConfig, SourceKind};
use crate::store::TrendStore;

pub fn cmd_source_add(
    settings: &Settings,
    category: &str,
    name: &str,
    method: &str,
    url: Option<&str>,
    session: Option<String>,
    wait_selector: Option<String>,
) -> anyhow::Result<()> {
    let scrape_method: ScrapeMethod = serde_yaml::from_str(method)
        .map_err(|_| anyhow::anyhow!("unknown scrape method '{method}'"))?;

    if SourceKind::parse(name).is_none() {
        println!(
            "{} '{name}' is not a recognized platform; it will scrape via the method's default",
            style("!").yellow()
        );
    }

    let config = SourceConfig {
        name: name.to_string(),
        scrape_method,
        session,
        wait_selector,
    };

    let store = TrendStore::open(&settings.paths.database)?;
    store.add_source(category, &config, url)?;

    println!(
        "{} registered '{name}' ({scrape_method}) under '{category}'",
        style("✓").green().bold()
    );
    Ok(())
}

pub fn cmd_source_list(settings: &Settings, category: &str) -> anyhow::Result<()> {
    let store = TrendStore::open(&settings.paths.database)?;
    let sources = store.sources_by_category(category)?;

    if sources.is_empty() {
        println!("No sources registered under '{category}'.");
        return Ok(());
    }

    println!(
        "{:<20} {:<20} {:<12} {}",
        style("NAME").bold(),
        style("METHOD").bold(),
        style("SESSION").bold(),
        style("MARKER").bold()
    );
    for source in &sources {
        println!(
            "{:<20} {:<20} {:<12} {}",
            source.name,
            source.scrape_method.to_string(),
            source.session.as_deref().unwrap_or("-"),
            source.wait_selector.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
