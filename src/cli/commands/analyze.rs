//! `analyze` - statistics and forecasts over stored trends.

use std::path::Path;

use crate::analyzer;
use crate::config::Settings;
use crate::output::{OutputFormat, OutputManager};
use crate::store::TrendStore;

pub fn cmd_analyze(
    settings: &Settings,
    category: Option<&str>,
    keyword: Option<&str>,
    days: u32,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let store = TrendStore::open(&settings.paths.database)?;
    let trends = store.trends(category, keyword, days)?;

    let analysis = analyzer::analyze(&trends);
    OutputManager::display(&analysis, format)?;

    if let Some(path) = output {
        OutputManager::save_to_file(&analysis, path)?;
    }
    Ok(())
}
