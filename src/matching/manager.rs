// src/matching/manager.rs - Parallel per-query evaluation with bounded concurrency
use futures::future::join_all;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::{DatasetKind, MatchError, Result};
use crate::matching::engine::{MatchingEngine, QueryOutcome};
use crate::models::core::QueryRecord;
use crate::models::stats_models::MatchOutcome;
use crate::utils::progress_bars::logging::MatchingLogger;
use crate::utils::progress_bars::progress_config::ProgressConfig;

/// Evaluates every query on the blocking pool, at most `concurrency` at a
/// time, and returns outcomes in input order regardless of completion order.
///
/// With a per-query timeout configured, a query that overruns stops scoring,
/// releases its permit and is reported as [`Diagnostic::QueryTimedOut`]; the
/// rest of the batch carries on.
pub async fn run_parallel(
    engine: Arc<MatchingEngine>,
    queries: Vec<QueryRecord>,
    progress_config: &ProgressConfig,
) -> Result<MatchOutcome> {
    if queries.is_empty() {
        return Err(MatchError::contract(DatasetKind::Query, "query table is empty"));
    }

    let config = engine.config().clone();
    let logger = MatchingLogger::new();
    logger.log_start(
        engine.len() + engine.master_diagnostics().len(),
        queries.len(),
        config.concurrency,
        true,
    );

    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let pb = progress_config.create_bar(queries.len() as u64);
    pb.set_message("Matching queries...");

    let tasks: Vec<JoinHandle<Result<QueryOutcome>>> = queries
        .into_iter()
        .enumerate()
        .map(|(row, query)| {
            spawn_query_task(
                row,
                query,
                Arc::clone(&engine),
                Arc::clone(&semaphore),
                config.query_timeout,
                pb.clone(),
            )
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (row, joined) in join_all(tasks).await.into_iter().enumerate() {
        let outcome = joined
            .map_err(|e| MatchError::TaskJoin(format!("query task {} panicked or was cancelled: {}", row, e)))??;
        outcomes.push(outcome);
    }
    pb.finish_with_message("Matching complete");
    logger.log_phase("Assembling results", None);

    let outcome = engine.assemble(outcomes, start);
    logger.log_outcome(&outcome);
    Ok(outcome)
}

fn spawn_query_task(
    row: usize,
    query: QueryRecord,
    engine: Arc<MatchingEngine>,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
    pb: ProgressBar,
) -> JoinHandle<Result<QueryOutcome>> {
    tokio::spawn(async move {
        let permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| MatchError::TaskJoin(format!("Failed to acquire semaphore permit: {}", e)))?;

        let outcome = tokio::task::spawn_blocking(move || {
            let _permit_guard = permit;
            engine.evaluate_within(row, &query, timeout)
        })
        .await
        .map_err(|e| MatchError::TaskJoin(e.to_string()))?;

        pb.inc(1);
        Ok(outcome)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::models::core::MasterRecord;
    use crate::models::stats_models::Diagnostic;

    fn master() -> Vec<MasterRecord> {
        vec![
            MasterRecord::new("1", "Acme Corp"),
            MasterRecord::new("2", "Globex Inc"),
            MasterRecord::new("3", "Acme Corporation"),
            MasterRecord::new("4", "Initech Pvt Ltd"),
            MasterRecord::new("5", "Umbrella Company"),
        ]
    }

    fn queries() -> Vec<QueryRecord> {
        vec![
            QueryRecord::new("Initech Private Limited"),
            QueryRecord::new("ACME CORP"),
            QueryRecord { raw_name: None },
            QueryRecord::new("Corp Acme Widgets"),
            QueryRecord::new("Umbrela Co"),
            QueryRecord::new("Globax Incorporated"),
        ]
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_parallel_matches_sequential_order() {
        let mut config = MatchConfig::default();
        config.concurrency = 3;
        let engine = Arc::new(MatchingEngine::new(&master(), config).unwrap());

        let sequential = engine.run(&queries()).unwrap();
        let parallel = run_parallel(Arc::clone(&engine), queries(), &ProgressConfig::disabled())
            .await
            .unwrap();

        assert_eq!(parallel.results, sequential.results);
        assert_eq!(parallel.diagnostics, sequential.diagnostics);
        let names: Vec<&str> = parallel.results.iter().map(|r| r.query_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Initech Private Limited", "Corp Acme Widgets", "Umbrela Co", "Globax Incorporated"]
        );
        assert_eq!(parallel.stats.exact_matches, 1);
        assert_eq!(parallel.stats.skipped_queries, 1);
    }

    #[tokio::test]
    async fn test_empty_queries_rejected() {
        let engine = Arc::new(MatchingEngine::new(&master(), MatchConfig::default()).unwrap());
        let result = run_parallel(engine, Vec::new(), &ProgressConfig::disabled()).await;
        assert!(matches!(result, Err(MatchError::InputContractViolation { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_reports_without_aborting() {
        let big_master: Vec<MasterRecord> = (0..500)
            .map(|i| MasterRecord::new(i.to_string(), format!("Northern Star Trading House {}", i)))
            .collect();
        let mut config = MatchConfig::default();
        config.concurrency = 2;
        config.query_timeout = Some(Duration::from_millis(1));
        let engine = Arc::new(MatchingEngine::new(&big_master, config).unwrap());

        let slow = vec![
            QueryRecord::new("Northern Star Trading House Export Division"),
            QueryRecord::new("Northern Star Trading House 7"),
        ];
        let outcome = run_parallel(engine, slow, &ProgressConfig::disabled()).await.unwrap();

        assert!(outcome.stats.timed_out >= 1);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::QueryTimedOut { timeout_ms: 1, .. })));
        assert_eq!(outcome.stats.queries_total, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_query_frees_its_worker() {
        let big_master: Vec<MasterRecord> = (0..2000)
            .map(|i| MasterRecord::new(i.to_string(), format!("Northern Star Supplier {}", i)))
            .collect();
        let mut config = MatchConfig::default();
        config.concurrency = 1;
        config.query_timeout = Some(Duration::from_millis(250));
        let engine = Arc::new(MatchingEngine::new(&big_master, config).unwrap());

        // Eight tokens means 40320 orderings per master row, far past the limit
        let queries = vec![QueryRecord::new("a b c d e f g h"), QueryRecord::new("Northern Star")];
        let started = Instant::now();
        let outcome = run_parallel(engine, queries, &ProgressConfig::disabled()).await.unwrap();
        let wall = started.elapsed();

        assert!(wall < Duration::from_secs(5), "batch took {:?}", wall);
        assert_eq!(outcome.stats.timed_out, 1);
        assert_eq!(outcome.stats.unmatched, 1);
        assert_eq!(outcome.results[0].query_name, "Northern Star");
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::QueryTimedOut {
                query_name: "a b c d e f g h".to_string(),
                timeout_ms: 250,
            }]
        );
    }
}
