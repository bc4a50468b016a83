// src/config.rs

use crate::error::{MatchError, Result};
use log::{debug, info};
use std::env;
use std::time::Duration;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MAX_PERMUTATION_TOKENS: usize = 8;

pub const DEFAULT_LEGAL_SUFFIXES: [&str; 12] = [
    "incorporated", "inc", "llc", "ltd", "limited", "corp", "corporation", "plc", "co", "company", "pvt", "private",
];

/// Tunables for a matching run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Candidates kept per metric, and the length cap of the merged list
    pub top_k: usize,
    /// Queries with more tokens than this are scored on their original
    /// ordering only instead of every permutation
    pub max_permutation_tokens: usize,
    /// Whole-word suffixes removed before the token-set comparison
    pub legal_suffixes: Vec<String>,
    /// Number of queries evaluated at once by the parallel runner
    pub concurrency: usize,
    /// Upper bound on a single query's evaluation in the parallel runner
    pub query_timeout: Option<Duration>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_permutation_tokens: DEFAULT_MAX_PERMUTATION_TOKENS,
            legal_suffixes: DEFAULT_LEGAL_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            concurrency: num_cpus::get().max(1),
            query_timeout: None,
        }
    }
}

impl MatchConfig {
    /// Create configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let legal_suffixes: Vec<String> = env::var("MATCH_LEGAL_SUFFIXES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            top_k: env::var("MATCH_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_k),
            max_permutation_tokens: env::var("MATCH_MAX_PERMUTATION_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_permutation_tokens),
            legal_suffixes: if legal_suffixes.is_empty() {
                defaults.legal_suffixes
            } else {
                legal_suffixes
            },
            concurrency: env::var("MATCH_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.concurrency),
            query_timeout: env::var("MATCH_QUERY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis),
        };

        debug!("Match config from env: {:?}", config);
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig("top_k must be at least 1".to_string()));
        }
        if self.max_permutation_tokens == 0 {
            return Err(MatchError::InvalidConfig(
                "max_permutation_tokens must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(MatchError::InvalidConfig("concurrency must be at least 1".to_string()));
        }
        if let Some(bad) = self.legal_suffixes.iter().find(|s| s.split_whitespace().count() != 1) {
            return Err(MatchError::InvalidConfig(format!(
                "legal suffix '{}' must be a single token",
                bad
            )));
        }
        Ok(())
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("⚙️  Matching configuration");
        info!("   top-K per metric: {}", self.top_k);
        info!("   permutation token cap: {}", self.max_permutation_tokens);
        info!("   legal suffixes: {:?}", self.legal_suffixes);
        info!("   concurrency: {}", self.concurrency);
        match self.query_timeout {
            Some(t) => info!("   per-query timeout: {} ms", t.as_millis()),
            None => info!("   per-query timeout: none"),
        }
    }
}
