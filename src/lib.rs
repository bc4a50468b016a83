// src/lib.rs
pub mod config;
pub mod dataset;
pub mod error;
pub mod matching;
pub mod models;
pub mod utils;

pub use config::MatchConfig;
pub use error::{MatchError, Result};
pub use matching::engine::MatchingEngine;
pub use models::core::{MasterRecord, MatchResult, QueryRecord};
pub use models::stats_models::{Diagnostic, MatchOutcome, RunStats};
