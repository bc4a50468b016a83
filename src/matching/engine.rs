// src/matching/engine.rs - Per-query matching pipeline over a prepared master table
use log::debug;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::config::MatchConfig;
use crate::error::{DatasetKind, MatchError, Result};
use crate::matching::jaccard::{jaccard_distance_sets, token_set};
use crate::matching::normalize::{normalize, SuffixStripper};
use crate::matching::permutation::PermutedQuery;
use crate::matching::selection::{interleave_merge, top_k};
use crate::models::core::{CandidateSet, MasterRecord, MatchResult, QueryRecord};
use crate::models::stats_models::{Diagnostic, MatchOutcome, RunStats};
use crate::utils::progress_bars::logging::MatchingLogger;

/// A usable master row with its derived forms computed once per run.
#[derive(Debug, Clone)]
struct MasterEntry {
    name: String,
    normalized_name: String,
    tokens: HashSet<String>,
}

/// What happened to a single query record.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Name was unusable; nothing was scored
    Skipped(Diagnostic),
    /// Normalized name equals a master name; resolved, nothing emitted
    ExactMatch,
    /// Ranked candidates, plus a diagnostic when scoring was degraded
    Unmatched(MatchResult, Option<Diagnostic>),
    /// Scoring passed the per-query deadline and was abandoned
    TimedOut(Diagnostic),
}

/// Read-only matching context built from the master table.
///
/// Normalized names, the exact-match set and the suffix-stripped token sets
/// are derived once here and shared by every query in the run.
#[derive(Debug)]
pub struct MatchingEngine {
    config: MatchConfig,
    stripper: SuffixStripper,
    entries: Vec<MasterEntry>,
    exact_names: HashSet<String>,
    master_total: usize,
    master_diagnostics: Vec<Diagnostic>,
}

impl MatchingEngine {
    pub fn new(master: &[MasterRecord], config: MatchConfig) -> Result<Self> {
        config.validate()?;
        let stripper = SuffixStripper::new(&config.legal_suffixes)?;

        if master.is_empty() {
            return Err(MatchError::contract(DatasetKind::Master, "master table is empty"));
        }

        let mut entries = Vec::with_capacity(master.len());
        let mut exact_names = HashSet::with_capacity(master.len());
        let mut master_diagnostics = Vec::new();

        for (row, record) in master.iter().enumerate() {
            let name = match usable_name(record.name.as_deref()) {
                Ok(name) => name,
                Err(reason) => {
                    master_diagnostics.push(Diagnostic::DataQuality {
                        dataset: DatasetKind::Master,
                        row,
                        reason: format!("{} (code '{}')", reason, record.code),
                    });
                    continue;
                }
            };

            let normalized_name = normalize(name);
            exact_names.insert(normalized_name.clone());
            entries.push(MasterEntry {
                name: name.to_string(),
                tokens: token_set(name, &stripper),
                normalized_name,
            });
        }

        if entries.is_empty() {
            return Err(MatchError::contract(
                DatasetKind::Master,
                format!("none of the {} master rows has a usable name", master.len()),
            ));
        }

        debug!(
            "Prepared {} master entries ({} distinct normalized names, {} skipped)",
            entries.len(),
            exact_names.len(),
            master_diagnostics.len()
        );

        Ok(Self {
            config,
            stripper,
            entries,
            exact_names,
            master_total: master.len(),
            master_diagnostics,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Number of usable master rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn master_diagnostics(&self) -> &[Diagnostic] {
        &self.master_diagnostics
    }

    pub fn is_exact_match(&self, name: &str) -> bool {
        self.exact_names.contains(&normalize(name))
    }

    /// Ranked candidate indices for a query name, and the prepared query (which
    /// records whether the permutation metric ran degraded). Does not perform
    /// the exact-match check. Returns `None` if `deadline` passes mid-scan.
    pub fn rank_candidates(
        &self,
        query_name: &str,
        deadline: Option<Instant>,
    ) -> Option<(CandidateSet, PermutedQuery)> {
        let normalized = normalize(query_name);
        let permuted = PermutedQuery::new(&normalized, self.config.max_permutation_tokens);
        let query_tokens = token_set(query_name, &self.stripper);

        let mut permutation_scores = Vec::with_capacity(self.entries.len());
        let mut jaccard_scores = Vec::with_capacity(self.entries.len());
        for (idx, entry) in self.entries.iter().enumerate() {
            let distance = permuted.distance_within(&entry.normalized_name, deadline)?;
            permutation_scores.push((idx, distance));
            jaccard_scores.push((idx, jaccard_distance_sets(&query_tokens, &entry.tokens)));
        }

        let k = self.config.top_k;
        let top_permutation = top_k(permutation_scores, k);
        let top_jaccard = top_k(jaccard_scores, k);
        Some((interleave_merge(&top_permutation, &top_jaccard, k), permuted))
    }

    /// Runs the full pipeline for one query record, bounded by the configured
    /// per-query timeout.
    pub fn evaluate(&self, row: usize, query: &QueryRecord) -> QueryOutcome {
        self.evaluate_within(row, query, self.config.query_timeout)
    }

    /// Runs the full pipeline for one query record. The clock starts when this
    /// is called; once `timeout` elapses scoring stops and the query is
    /// reported as [`Diagnostic::QueryTimedOut`].
    pub fn evaluate_within(&self, row: usize, query: &QueryRecord, timeout: Option<Duration>) -> QueryOutcome {
        let deadline = timeout.map(|t| Instant::now() + t);

        let raw_name = match usable_name(query.raw_name.as_deref()) {
            Ok(name) => name,
            Err(reason) => {
                return QueryOutcome::Skipped(Diagnostic::DataQuality {
                    dataset: DatasetKind::Query,
                    row,
                    reason: reason.to_string(),
                })
            }
        };

        if self.is_exact_match(raw_name) {
            debug!("Query '{}' resolved by exact match", raw_name);
            return QueryOutcome::ExactMatch;
        }

        let (ranked, permuted) = match self.rank_candidates(raw_name, deadline) {
            Some(ranked) => ranked,
            None => {
                let timeout_ms = timeout.map_or(0, |t| t.as_millis() as u64);
                debug!("Query {} ('{}') exceeded {} ms", row, raw_name, timeout_ms);
                return QueryOutcome::TimedOut(Diagnostic::QueryTimedOut {
                    query_name: raw_name.to_string(),
                    timeout_ms,
                });
            }
        };

        let degraded = permuted.is_degraded();
        let diagnostic = degraded.then(|| Diagnostic::ResourceBoundExceeded {
            query_name: raw_name.to_string(),
            token_count: permuted.token_count(),
            cap: self.config.max_permutation_tokens,
        });

        let candidates: Vec<String> = ranked
            .into_iter()
            .map(|idx| self.entries[idx].name.clone())
            .collect();
        debug!("Query '{}' -> {} candidates", raw_name, candidates.len());

        QueryOutcome::Unmatched(
            MatchResult {
                query_name: raw_name.to_string(),
                candidates,
                degraded,
            },
            diagnostic,
        )
    }

    /// Evaluates every query in order on the current thread.
    pub fn run(&self, queries: &[QueryRecord]) -> Result<MatchOutcome> {
        if queries.is_empty() {
            return Err(MatchError::contract(DatasetKind::Query, "query table is empty"));
        }

        let logger = MatchingLogger::new();
        logger.log_start(self.master_total, queries.len(), self.config.concurrency, false);

        let start = Instant::now();
        let outcomes: Vec<QueryOutcome> = queries
            .iter()
            .enumerate()
            .map(|(row, query)| self.evaluate(row, query))
            .collect();

        let outcome = self.assemble(outcomes, start);
        logger.log_outcome(&outcome);
        Ok(outcome)
    }

    /// Folds per-query outcomes, already in input order, into a run result.
    pub(crate) fn assemble(&self, outcomes: Vec<QueryOutcome>, start: Instant) -> MatchOutcome {
        let mut stats = RunStats {
            master_total: self.master_total,
            skipped_master: self.master_diagnostics.len(),
            queries_total: outcomes.len(),
            ..Default::default()
        };
        let mut results = Vec::new();
        let mut diagnostics = self.master_diagnostics.clone();

        for outcome in outcomes {
            match outcome {
                QueryOutcome::Skipped(d) => {
                    stats.skipped_queries += 1;
                    diagnostics.push(d);
                }
                QueryOutcome::ExactMatch => stats.exact_matches += 1,
                QueryOutcome::Unmatched(result, degraded) => {
                    stats.unmatched += 1;
                    if let Some(d) = degraded {
                        stats.degraded += 1;
                        diagnostics.push(d);
                    }
                    results.push(result);
                }
                QueryOutcome::TimedOut(d) => {
                    stats.timed_out += 1;
                    diagnostics.push(d);
                }
            }
        }

        stats.elapsed = start.elapsed();
        MatchOutcome {
            results,
            diagnostics,
            stats,
        }
    }
}

fn usable_name(name: Option<&str>) -> std::result::Result<&str, &'static str> {
    match name {
        None => Err("name is null or not text"),
        Some(n) if n.trim().is_empty() => Err("name is blank"),
        Some(n) => Ok(n),
    }
}
