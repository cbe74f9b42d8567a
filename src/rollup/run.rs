//! Fan-out of node aggregation across the rayon pool

use super::aggregate::{aggregate_node, NodeRollup};
use super::TabScope;
use crate::error::NodeAggregationError;
use crate::hierarchy::{HierarchyIndex, ManagerNode};
use crate::ledger::SelectedBatch;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashSet;

/// Outcome of aggregating every manager node
#[derive(Debug, Clone, Default)]
pub struct RollupRun {
    /// Eligible nodes, in level order then identifier
    pub rollups: Vec<NodeRollup>,
    pub failures: Vec<NodeAggregationError>,
    /// Nodes skipped because no team member earned anything in the batch
    pub ineligible: Vec<ManagerNode>,
}

impl RollupRun {
    pub fn report_count(&self) -> usize {
        self.rollups.len()
    }
}

enum NodeOutcome {
    Rolled(NodeRollup),
    Ineligible(ManagerNode),
    Failed(NodeAggregationError),
}

/// Aggregate every manager node of the index against one batch
///
/// Index and batch are shared read-only across workers. `collect` keeps the
/// input order, so output order never depends on which worker finished first.
pub fn rollup_all(index: &HierarchyIndex, batch: &SelectedBatch, scope: TabScope) -> RollupRun {
    let nodes = index.manager_nodes();
    let batch_reps: HashSet<&str> = batch.rep_ids();

    let outcomes: Vec<NodeOutcome> = nodes
        .par_iter()
        .map(|node| match aggregate_node(index, batch, &batch_reps, node, scope) {
            Ok(Some(rollup)) => NodeOutcome::Rolled(rollup),
            Ok(None) => NodeOutcome::Ineligible(node.clone()),
            Err(err) => NodeOutcome::Failed(err),
        })
        .collect();

    let mut run = RollupRun::default();
    for outcome in outcomes {
        match outcome {
            NodeOutcome::Rolled(rollup) => run.rollups.push(rollup),
            NodeOutcome::Ineligible(node) => run.ineligible.push(node),
            NodeOutcome::Failed(err) => {
                warn!("Node aggregation failed: {}", err);
                run.failures.push(err);
            }
        }
    }

    info!(
        "Rolled up {} of {} manager nodes ({} without batch activity, {} failed)",
        run.rollups.len(),
        nodes.len(),
        run.ineligible.len(),
        run.failures.len()
    );
    run
}
