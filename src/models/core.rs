// src/models/core.rs
use serde::{Deserialize, Serialize};

/// A row of the canonical master table. `name` is `None` when the source
/// cell was null or not a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub code: String,
    pub name: Option<String>,
}

impl MasterRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub raw_name: Option<String>,
}

impl QueryRecord {
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: Some(raw_name.into()),
        }
    }
}

/// Ranked indices into the prepared master table, best first, no duplicates.
pub type CandidateSet = Vec<usize>;

/// Ranked suggestions for a query that had no exact match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub query_name: String,
    pub candidates: Vec<String>,
    /// Scored on the original token ordering only (token cap exceeded)
    pub degraded: bool,
}
