// src/error.rs
use thiserror::Error;

/// Which input table a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum DatasetKind {
    Master,
    Query,
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKind::Master => write!(f, "master"),
            DatasetKind::Query => write!(f, "query"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Input contract violated for {dataset} dataset: {reason}")]
    InputContractViolation { dataset: DatasetKind, reason: String },

    #[error("Invalid matching configuration: {0}")]
    InvalidConfig(String),

    #[error("Matching task failed: {0}")]
    TaskJoin(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatchError {
    pub fn contract(dataset: DatasetKind, reason: impl Into<String>) -> Self {
        MatchError::InputContractViolation {
            dataset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
