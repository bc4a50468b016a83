// src/main.rs
use anyhow::{Context, Result};
use buyer_match_lib::config::MatchConfig;
use buyer_match_lib::dataset::{load_master, load_queries, write_results};
use buyer_match_lib::matching::engine::MatchingEngine;
use buyer_match_lib::matching::manager::run_parallel;
use buyer_match_lib::utils::env::load_env;
use buyer_match_lib::utils::get_memory_usage;
use buyer_match_lib::utils::progress_bars::logging::MatchingLogger;
use buyer_match_lib::utils::progress_bars::progress_config::ProgressConfig;
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct MatchArgs {
    /// JSON records with Master_Code and Master_Name columns
    #[arg(long)]
    master: PathBuf,

    /// JSON records with a Buyer_Name column
    #[arg(long)]
    queries: PathBuf,

    /// Write results here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Candidates kept per metric and in the merged list
    #[arg(long)]
    top_k: Option<usize>,

    /// Token count above which only the original ordering is scored
    #[arg(long)]
    max_permutation_tokens: Option<usize>,

    /// Queries evaluated concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-query evaluation timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl MatchArgs {
    fn apply_to(&self, config: &mut MatchConfig) {
        if let Some(k) = self.top_k {
            config.top_k = k;
        }
        if let Some(cap) = self.max_permutation_tokens {
            config.max_permutation_tokens = cap;
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n;
        }
        if let Some(ms) = self.timeout_ms {
            config.query_timeout = Some(Duration::from_millis(ms));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = MatchArgs::parse();

    // Initialize logging and environment
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    load_env();

    let run_id = Uuid::new_v4();
    info!("Starting buyer name matching run {}", run_id);

    let mut config = MatchConfig::from_env();
    args.apply_to(&mut config);
    config.validate().context("Invalid matching configuration")?;
    config.log_config();

    let mut progress_config = ProgressConfig::from_env();
    if args.no_progress {
        progress_config.enabled = false;
    }

    let logger = MatchingLogger::new();
    logger.log_phase("Loading data", Some("reading master and query tables"));

    let master = load_master(&args.master)
        .with_context(|| format!("Failed to load master table from {}", args.master.display()))?;
    logger.log_dataset_loaded("master", master.len());

    let queries = load_queries(&args.queries)
        .with_context(|| format!("Failed to load query table from {}", args.queries.display()))?;
    logger.log_dataset_loaded("queries", queries.len());

    let engine = Arc::new(MatchingEngine::new(&master, config).context("Failed to prepare master table")?);
    logger.log_debug(&format!("Memory usage after preparation: {} MB", get_memory_usage()));

    let outcome = run_parallel(engine, queries, &progress_config)
        .await
        .context("Matching run failed")?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            write_results(BufWriter::new(file), &outcome.results).context("Failed to write results")?;
            info!("Wrote {} result entries to {}", outcome.results.len(), path.display());
        }
        None => {
            write_results(io::stdout().lock(), &outcome.results).context("Failed to write results")?;
            println!();
        }
    }

    info!(
        "Run {} finished: {} unmatched, {} diagnostics, memory {} MB",
        run_id,
        outcome.stats.unmatched,
        outcome.diagnostics.len(),
        get_memory_usage()
    );
    Ok(())
}
