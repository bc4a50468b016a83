// src/matching/normalize.rs - Name normalization and legal-suffix stripping
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::DEFAULT_LEGAL_SUFFIXES;
use crate::error::{MatchError, Result};

static DEFAULT_STRIPPER: Lazy<SuffixStripper> = Lazy::new(|| {
    SuffixStripper::new(DEFAULT_LEGAL_SUFFIXES.iter().copied())
        .expect("default legal suffix pattern is valid")
});

/// Case-folds and trims a name. This is the form used for exact matching and
/// for the permutation metric.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Strips the default legal-suffix vocabulary. See [`SuffixStripper`].
pub fn strip_legal_suffixes(name: &str) -> String {
    DEFAULT_STRIPPER.strip_legal_suffixes(name)
}

/// Removes whole-word legal suffixes ("inc", "llc", "pvt", ...) from names.
///
/// Matching uses word boundaries, so a suffix embedded in a longer token
/// ("coincidence") is left alone.
#[derive(Debug, Clone)]
pub struct SuffixStripper {
    pattern: Option<Regex>,
}

impl SuffixStripper {
    pub fn new<I, S>(suffixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .map(|s| regex::escape(&s))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        let re = Regex::new(&pattern)
            .map_err(|e| MatchError::InvalidConfig(format!("Invalid legal suffix pattern: {}", e)))?;
        Ok(Self { pattern: Some(re) })
    }

    pub fn strip_legal_suffixes(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let stripped = match &self.pattern {
            Some(re) => re.replace_all(&lowered, " ").into_owned(),
            None => lowered,
        };
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
