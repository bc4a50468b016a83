// src/models/stats_models.rs
use crate::error::DatasetKind;
use crate::models::core::MatchResult;
use serde::Serialize;
use std::time::Duration;

/// Recoverable problems found during a run. None of these abort the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// Row skipped because its name was null, non-text or blank
    DataQuality {
        dataset: DatasetKind,
        row: usize,
        reason: String,
    },
    /// Query had more tokens than the permutation cap; only its original
    /// ordering was scored
    ResourceBoundExceeded {
        query_name: String,
        token_count: usize,
        cap: usize,
    },
    /// Query evaluation exceeded the configured timeout and was dropped
    QueryTimedOut { query_name: String, timeout_ms: u64 },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DataQuality { dataset, row, reason } => {
                write!(f, "{} row {} skipped: {}", dataset, row, reason)
            }
            Diagnostic::ResourceBoundExceeded {
                query_name,
                token_count,
                cap,
            } => write!(
                f,
                "query '{}' has {} tokens (cap {}), scored on original ordering only",
                query_name, token_count, cap
            ),
            Diagnostic::QueryTimedOut {
                query_name,
                timeout_ms,
            } => write!(f, "query '{}' timed out after {} ms", query_name, timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub master_total: usize,
    pub skipped_master: usize,
    pub queries_total: usize,
    pub skipped_queries: usize,
    pub exact_matches: usize,
    pub unmatched: usize,
    pub degraded: usize,
    pub timed_out: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchOutcome {
    /// Unmatched queries in input order
    pub results: Vec<MatchResult>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RunStats,
}
