//! Incentive Rollup Engine
//!
//! Hierarchical rollup and aggregation of incentive payout batches:
//! - Identifier normalization across ledger, hierarchy and directory exports
//! - Hierarchy indexing with position and vacancy filtering
//! - Batch selection, catalog and per-representative statements
//! - Per-manager summary/detail rollups, fanned out over rayon
//! - Report assembly and directory coverage for distribution

pub mod config;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod identity;
pub mod ledger;
pub mod report;
pub mod rollup;
pub mod table;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use engine::{RollupEngine, RunOutput, RunWarning};
pub use error::{EngineError, EngineResult, NodeAggregationError, NodeFailure};
pub use hierarchy::{HierarchyIndex, Level, LevelOrder, ManagerNode};
pub use identity::normalize_id;
pub use ledger::{BatchSelection, IncentiveRecord, Ledger, SelectedBatch};
pub use report::{ManagerReport, MasterReport, ReportSet, ReportTab};
pub use rollup::{RollupLevel, TabScope};
pub use table::{Cell, Table};
