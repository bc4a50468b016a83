// src/utils/progress_bars/logging.rs - Logging helpers for matching runs
use log::{debug, info, warn};
use std::time::Instant;

use crate::models::stats_models::MatchOutcome;

/// Tag leading every buyer-matching log line.
const LOG_PREFIX: &str = "[BUYER] 🧾";

#[derive(Clone)]
pub struct MatchingLogger {
    start_time: Instant,
}

impl Default for MatchingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Mirrors the upload summary: one line per dataset with its row count.
    pub fn log_dataset_loaded(&self, dataset: &str, rows: usize) {
        info!(
            "{} 📊 Dataset '{}' loaded successfully with {} rows",
            LOG_PREFIX, dataset, rows
        );
    }

    pub fn log_start(&self, master_rows: usize, query_rows: usize, concurrency: usize, parallel: bool) {
        info!(
            "{} 🚀 Starting buyer name matching: {} queries against {} master rows{}",
            LOG_PREFIX,
            query_rows,
            master_rows,
            if parallel {
                format!(" ({} workers)", concurrency)
            } else {
                " (sequential)".to_string()
            }
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        let msg = if let Some(details) = details {
            format!(
                "{} 🔄 Phase: {} - {} [+{:.1}s]",
                LOG_PREFIX, phase, details, elapsed.as_secs_f32()
            )
        } else {
            format!(
                "{} 🔄 Phase: {} [+{:.1}s]",
                LOG_PREFIX, phase, elapsed.as_secs_f32()
            )
        };
        info!("{}", msg);
    }

    pub fn log_outcome(&self, outcome: &MatchOutcome) {
        let stats = &outcome.stats;
        for diagnostic in &outcome.diagnostics {
            self.log_warning(&diagnostic.to_string());
        }

        info!(
            "{} 🎉 COMPLETED: {} queries in {:.2?}",
            LOG_PREFIX, stats.queries_total, stats.elapsed
        );
        info!(
            "{} 📊 Results: {} exact matches, {} with candidates, {} skipped",
            LOG_PREFIX, stats.exact_matches, stats.unmatched, stats.skipped_queries
        );

        if stats.skipped_master > 0 {
            warn!(
                "{} ⚠️  {} of {} master rows were unusable and ignored",
                LOG_PREFIX, stats.skipped_master, stats.master_total
            );
        }
        if stats.degraded > 0 {
            warn!(
                "{} ⚠️  {} queries exceeded the permutation token cap and were scored degraded",
                LOG_PREFIX, stats.degraded
            );
        }
        if stats.timed_out > 0 {
            warn!(
                "{} ⏰ {} queries timed out and produced no candidates",
                LOG_PREFIX, stats.timed_out
            );
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!("{} ⚠️  {}", LOG_PREFIX, message);
    }

    pub fn log_debug(&self, message: &str) {
        debug!("{} 🔍 {}", LOG_PREFIX, message);
    }
}
