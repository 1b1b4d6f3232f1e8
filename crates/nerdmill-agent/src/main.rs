//! nerdmill: batch entity annotation and evaluation.
//! Entry point for the command-line binary.

mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env before anything reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "nerdmill=debug" } else { "nerdmill=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::debug!("nerdmill {}", env!("CARGO_PKG_VERSION"));

    commands::run(cli).await
}
