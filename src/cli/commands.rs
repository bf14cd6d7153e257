//! CLI commands implementation.

mod analyze;
mod close;
mod login;
mod scrape;
mod source;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::Settings;
use crate::models::EngineKind;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "trends")]
#[command(about = "Keyword trend scraping and analysis")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to a service and save the session for reuse
    Login {
        /// Service to log in to (twitter, google)
        service: String,
        /// Browser engine to launch
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,
    },

    /// Scrape all keywords of a category from its configured sources
    Scrape {
        /// Category name from the config
        category: String,
        /// Write the scraped records to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Items to collect per keyword per source
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Browser engine to launch
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,
    },

    /// Analyze stored trends for a category
    Analyze {
        /// Category name; omit to analyze everything
        category: Option<String>,
        /// Narrow to a single keyword
        #[arg(short, long)]
        keyword: Option<String>,
        /// Look-back window in days
        #[arg(short, long, default_value = "30")]
        days: u32,
        /// Output rendering
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
        format: OutputFormat,
        /// Write the analysis to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage registered data sources
    Source {
        #[command(subcommand)]
        command: SourceCommands,
    },

    /// Close any engine held by this invocation
    Close,
}

#[derive(Subcommand)]
enum SourceCommands {
    /// Register a data source under a category
    Add {
        /// Category the source belongs to
        category: String,
        /// Platform name (twitter, google_trends, hackernews, ...)
        name: String,
        /// Scrape method: browser-automation, request or simulated
        #[arg(short, long, default_value = "browser-automation")]
        method: String,
        /// Endpoint or page URL, informational
        #[arg(long)]
        url: Option<String>,
        /// Session name override
        #[arg(long)]
        session: Option<String>,
        /// Readiness marker selector override
        #[arg(long)]
        wait_selector: Option<String>,
    },
    /// List registered sources for a category
    List {
        category: String,
    },
}

/// Entry point. Every command failure is rendered here; the process always
/// terminates cleanly.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) if cli.config.is_none() => {
            // No explicit config: defaults keep read-only commands usable
            tracing::debug!("using default settings: {err:#}");
            Settings::default()
        }
        Err(err) => {
            print_failure(&err);
            return Ok(());
        }
    };

    let result = match cli.command {
        Commands::Login { service, engine } => {
            login::cmd_login(&settings, &service, engine).await
        }
        Commands::Scrape {
            category,
            output,
            limit,
            engine,
        } => scrape::cmd_scrape(&settings, &category, output.as_deref(), limit, engine).await,
        Commands::Analyze {
            category,
            keyword,
            days,
            format,
            output,
        } => analyze::cmd_analyze(
            &settings,
            category.as_deref(),
            keyword.as_deref(),
            days,
            format,
            output.as_deref(),
        ),
        Commands::Source { command } => match command {
            SourceCommands::Add {
                category,
                name,
                method,
                url,
                session,
                wait_selector,
            } => source::cmd_source_add(
                &settings,
                &category,
                &name,
                &method,
                url.as_deref(),
                session,
                wait_selector,
            ),
            SourceCommands::List { category } => source::cmd_source_list(&settings, &category),
        },
        Commands::Close => close::cmd_close().await,
    };

    if let Err(err) = result {
        print_failure(&err);
    }
    Ok(())
}

fn print_failure(err: &anyhow::Error) {
    eprintln!("{} {err:#}", style("✗").red().bold());
}
