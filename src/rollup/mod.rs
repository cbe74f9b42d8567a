//! Rollup aggregation: per-node summary and detail tabs

mod aggregate;
mod rows;
mod run;

pub use aggregate::{aggregate_node, aggregate_whole, build_level, NodeRollup};
pub use rows::{DetailRow, RollupLevel, SummaryRow};
pub use run::{rollup_all, RollupRun};

pub(crate) use rows::checked_total;

use serde::{Deserialize, Serialize};

/// What a sub-level tab rolls up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabScope {
    /// Records earned by the people holding the sub-level position
    #[default]
    Personal,
    /// Every team record, grouped by the holder's ancestor at the sub-level
    Team,
}
