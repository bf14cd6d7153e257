//! TrendAcquire - keyword trend acquisition and analysis.
//!
//! A tool for collecting trend signals for keywords across online platforms
//! and producing lightweight aggregate statistics per keyword and source.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendacquire::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "trendacquire=info"
    } else {
        "trendacquire=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
