//! CLI parser and subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use nerdmill_common::Config;
use nerdmill_eval::evaluate;
use nerdmill_ingestion::{discover, BatchDriver, BatchOptions, BatchResult, NerdClient, Renderer};
use nerdmill_ner::{EntityAggregator, Profile};

#[derive(Debug, Parser)]
#[command(name = "nerdmill")]
#[command(about = "Entity annotation of document batches and scoring against gold labels")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: $NERDMILL_CONFIG, then ./nerdmill.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Annotate every document of a directory and write .json/.tei/.csv outputs
    Annotate {
        /// Directory of input documents
        #[arg(long = "in", value_name = "DIR")]
        input: PathBuf,

        /// Directory receiving the outputs
        #[arg(long = "out", value_name = "DIR")]
        output: PathBuf,

        /// Extraction profile: generic or species
        #[arg(long)]
        profile: Option<String>,
    },

    /// Score the .csv outputs of a directory against a gold file
    Evaluate {
        /// Tab-separated gold file
        #[arg(long, value_name = "FILE")]
        gold: PathBuf,

        /// Directory holding the .csv outputs
        #[arg(long = "out", value_name = "DIR")]
        output: PathBuf,

        /// Rank value of rows that count as candidates (overrides config)
        #[arg(long)]
        category: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Annotate { input, output, profile } => {
            let result = annotate(&config, &input, &output, profile.as_deref()).await?;
            if result.skipped > 0 {
                for error in result.errors() {
                    warn!("{error}");
                }
            }
            Ok(())
        }
        Commands::Evaluate { gold, output, category, json } => {
            let category = category.unwrap_or_else(|| config.evaluation.category.clone());
            let report = evaluate(&gold, &output, &category)
                .with_context(|| format!("evaluating {}", output.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
            Ok(())
        }
    }
}

async fn annotate(
    config: &Config,
    input: &Path,
    output: &Path,
    profile: Option<&str>,
) -> anyhow::Result<BatchResult> {
    let profile = Profile::from_name(profile)?;
    let documents = discover(input, &config.batch.extensions)?;
    if documents.is_empty() {
        warn!(dir = %input.display(), "No documents to annotate");
    }

    let client = NerdClient::from_config(&config.service)?;
    info!(url = client.url(), profile = profile.name(), documents = documents.len(), "Annotating");

    let renderer = Renderer::new(config.output.template_dir.as_deref())?;
    let options = BatchOptions {
        out_dir: output.to_path_buf(),
        parse_retry_limit: config.batch.parse_retry_limit(),
    };

    let mut driver = BatchDriver::new(Arc::new(client), EntityAggregator::new(profile), renderer, options);
    Ok(driver.run(&documents).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotate() {
        let cli = Cli::try_parse_from([
            "nerdmill", "annotate", "--in", "papers", "--out", "out", "--profile", "species",
        ])
        .unwrap();
        match cli.command {
            Commands::Annotate { input, output, profile } => {
                assert_eq!(input, PathBuf::from("papers"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(profile.as_deref(), Some("species"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_evaluate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "nerdmill", "evaluate", "--gold", "gold.tsv", "--out", "out", "--json", "-v", "--config", "n.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("n.toml")));
        assert!(matches!(cli.command, Commands::Evaluate { json: true, category: None, .. }));
    }

    #[test]
    fn test_annotate_requires_dirs() {
        assert!(Cli::try_parse_from(["nerdmill", "annotate", "--in", "papers"]).is_err());
    }

    #[tokio::test]
    async fn test_unknown_profile_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = annotate(&Config::default(), dir.path(), dir.path(), Some("mineral"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mineral"));
    }

    #[tokio::test]
    async fn test_empty_input_dir_finishes_cleanly() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let result = annotate(&Config::default(), input.path(), output.path(), None).await.unwrap();
        assert_eq!(result.documents_total, 0);
        assert_eq!(result.profile, "generic");
    }
}
