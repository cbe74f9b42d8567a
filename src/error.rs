//! Error types for the rollup engine
//!
//! Fatal problems (missing columns, bad configuration, unreadable input) are
//! `EngineError`s and abort a run before any aggregation starts. A failure
//! inside a single manager node is a `NodeAggregationError`; it is collected
//! next to the successful reports instead of aborting the run.

use crate::hierarchy::Level;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Table '{table}' is missing required column '{column}'")]
    Schema { table: String, column: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Why a single manager node could not be aggregated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeFailure {
    #[error("payout total overflowed while aggregating {level} tab")]
    Overflow { level: Level },

    #[error("{level} tab does not reconcile: summary {summary} vs detail {detail}")]
    Unreconciled {
        level: Level,
        summary: String,
        detail: String,
    },
}

/// A per-node failure, tagged with the node it belongs to
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{level} {manager_id} ({manager_name}): {failure}")]
pub struct NodeAggregationError {
    pub level: Level,
    pub manager_id: String,
    pub manager_name: String,
    pub failure: NodeFailure,
}
