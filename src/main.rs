//! Paddock CLI
//!
//! Tier classification and sized bet recommendations for a scored race card.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paddock::cli::{self, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging (stderr, so JSON output stays clean)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "paddock=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { input, format } => cli::run_classify(input, format),
        Commands::Recommend {
            input,
            format,
            risk,
            budget,
            complexity,
        } => cli::run_recommend(input, format, risk, budget, complexity),
    }
}
