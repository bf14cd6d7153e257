//! Terminal and file rendering of analysis results.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use crate::analyzer::{Analysis, StatKind, TrendDirection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal => f.write_str("terminal"),
            Self::Json => f.write_str("json"),
        }
    }
}

pub struct OutputManager;

impl OutputManager {
    pub fn display(analysis: &Analysis, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Terminal => {
                Self::render_terminal(analysis);
                Ok(())
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(analysis)?);
                Ok(())
            }
        }
    }

    fn render_terminal(analysis: &Analysis) {
        if analysis.is_empty() {
            println!("{}", style("No stored trends matched.").yellow());
            return;
        }

        println!();
        println!(
            "{:<24} {:<14} {:<44}",
            style("KEYWORD").bold(),
            style("SOURCE").bold(),
            style("STATS").bold()
        );

        for entry in &analysis.stats {
            let summary = match &entry.stats {
                StatKind::Series {
                    mean,
                    std_dev,
                    latest,
                    direction,
                } => {
                    let arrow = match direction {
                        TrendDirection::Rising => style("rising").green(),
                        TrendDirection::Falling => style("falling").red(),
                    };
                    format!("mean {mean:.1}  sd {std_dev:.1}  latest {latest:.0}  {arrow}")
                }
                StatKind::Posts { count, engagement } => {
                    format!("{count} posts  engagement {engagement}")
                }
                StatKind::Unreadable { error } => style(error).red().to_string(),
            };
            println!("{:<24} {:<14} {summary}", entry.keyword, entry.source);
        }

        if !analysis.predictions.is_empty() {
            println!();
            println!("{}", style("Forecast (next 3 steps)").bold());
            for (keyword, forecast) in &analysis.predictions {
                println!(
                    "  {:<22} {:.1} / {:.1} / {:.1}",
                    keyword, forecast[0], forecast[1], forecast[2]
                );
            }
        }
        println!();
    }

    /// Write any serializable result as pretty JSON.
    pub fn save_to_file<T: Serialize>(value: &T, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(path, json)
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("{} {}", style("Saved").green().bold(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_to_file_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/results.json");

        OutputManager::save_to_file(&serde_json::json!({"keyword": "espresso"}), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"keyword\": \"espresso\""));
    }
}
