mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use suitecal_core::settings::SiteSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "suitecal")]
#[command(about = "Sync suite booking feeds and inspect availability calendars")]
struct Cli {
    /// Site root that data/ and public/ are resolved against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured feed and rewrite the availability records
    Sync,
    /// Add suites to the feed config and create empty availability records
    Seed {
        /// Suite to add or rename, as `<id>=<name>` (repeatable)
        #[arg(long = "suite", value_parser = commands::seed::parse_suite_arg)]
        suites: Vec<(String, String)>,
    },
    /// Print a suite's availability calendar
    Show {
        /// Suite id (the key in data/config.json)
        suite: String,

        /// Number of months to show
        #[arg(short, long)]
        months: Option<u32>,

        /// Render as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,

        /// Read the record from a published site instead of the local store
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = SiteSettings::load(&cli.root)?;

    match cli.command {
        Commands::Sync => commands::sync::run(&settings).await,
        Commands::Seed { suites } => commands::seed::run(&settings, &suites).await,
        Commands::Show {
            suite,
            months,
            today,
            url,
        } => commands::show::run(&settings, &suite, months, today.as_deref(), url.as_deref()).await,
    }
}

/// Diagnostics go to stderr; stdout is reserved for calendars and summaries.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "suitecal=info,suitecal_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
