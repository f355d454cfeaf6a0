//! `argus-ingest`: drive the advisory ingestion pipeline.
//!
//! Exit codes: 0 on clean or budget-exhausted termination (including a
//! capacity stop, which leaves resumable state), 1 on startup failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use argus_core::config::ArgusConfig;
use argus_core::errors::ArgusResult;
use argus_core::traits::{IAdvisoryFeed, IKnowledgeStore};
use argus_ingest::{seed::seed_taxonomy, GhsaFeed, IngestPipeline};
use argus_store::StoreEngine;

#[derive(Parser)]
#[command(name = "argus-ingest", about = "Advisory ingestion for the Argus knowledge store")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline, resuming from persisted partition state.
    Run {
        /// Override the wall-clock budget in seconds.
        #[arg(long)]
        budget_secs: Option<u64>,
    },
    /// Reset all partition state for the feed source back to fresh.
    Reset,
    /// Seed the category and weakness catalogs into the store.
    Seed,
    /// Print per-partition progress without fetching anything.
    Status,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("argus={default},argus_ingest={default}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_store(config: &ArgusConfig) -> ArgusResult<StoreEngine> {
    // validate() already guaranteed the path is present.
    let path = config
        .store
        .path
        .clone()
        .ok_or(argus_core::errors::ConfigError::MissingStorePath)?;
    StoreEngine::open(&path)
}

async fn execute(cli: Cli) -> ArgusResult<()> {
    let mut config = ArgusConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let store = Arc::new(open_store(&config)?);

    match cli.command {
        Command::Run { budget_secs } => {
            if let Some(secs) = budget_secs {
                config.ingest.run_budget_secs = secs;
            }
            let provider = argus_embeddings::build_provider(&config.embedding, &config.ingest);
            let feed: Arc<dyn IAdvisoryFeed> = Arc::new(GhsaFeed::new(
                config.ingest.feed_endpoint.clone(),
                config.ingest.feed_token.clone(),
                config.ingest.request_timeout(),
            ));
            let pipeline = IngestPipeline::new(
                Arc::clone(&store) as Arc<dyn IKnowledgeStore>,
                feed,
                provider,
                config.ingest.clone(),
            );
            let report = pipeline.run().await?;
            print!("{}", report.render());
        }
        Command::Reset => {
            let cleared = store.reset_partitions(&config.ingest.source)?;
            info!(cleared, source = config.ingest.source, "partition state reset");
            println!("cleared {cleared} partition(s) for {}", config.ingest.source);
        }
        Command::Seed => {
            let provider = argus_embeddings::build_provider(&config.embedding, &config.ingest);
            let (categories, weaknesses) = seed_taxonomy(store.as_ref(), provider.as_ref()).await?;
            println!("seeded {categories} categories, {weaknesses} weaknesses");
        }
        Command::Status => {
            let partitions = store.list_partitions(&config.ingest.source)?;
            if partitions.is_empty() {
                println!("no partition state for {}", config.ingest.source);
            }
            for (key, state) in partitions {
                println!(
                    "{key}: page {} fetched {} inserted {} {}",
                    state.last_page,
                    state.total_fetched,
                    state.total_inserted,
                    if state.exhausted { "exhausted" } else { "resumable" },
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "startup or run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
