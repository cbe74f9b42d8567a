//! Per-node rollup aggregation
//!
//! One function builds every tab of every report. It is driven by the level
//! ordering: a node gets one tab per level below it, and each tab carries a
//! hierarchy column for every level strictly between the node and the tab.
//! The master report reuses the same function over the whole hierarchy.

use super::rows::{checked_total, DetailRow, RollupLevel, SummaryRow};
use super::TabScope;
use crate::error::{NodeAggregationError, NodeFailure};
use crate::hierarchy::{HierarchyIndex, HierarchyRecord, Level, ManagerNode, Subtree};
use crate::ledger::{IncentiveRecord, SelectedBatch};
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Everything produced for one eligible manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRollup {
    pub node: ManagerNode,
    /// Representatives under the node, with or without incentives
    pub team_size: usize,
    pub levels: Vec<RollupLevel>,
    pub total_payout: Decimal,
    pub total_people: usize,
}

/// Running totals for one summary row
struct Group {
    id: String,
    name: String,
    hierarchy: Vec<String>,
    total: Decimal,
    count: usize,
}

/// First subtree row naming each identifier at `level`
fn rows_by_member<'a>(subtree: &Subtree<'a>, level: Level) -> HashMap<&'a str, &'a HierarchyRecord> {
    let mut rows = HashMap::new();
    for &row in subtree.rows() {
        if let Some(person) = row.at(level) {
            rows.entry(person.id.as_str()).or_insert(row);
        }
    }
    rows
}

/// Build one summary/detail tab for `level`
///
/// Returns `Ok(None)` when no batch record lands on the tab.
pub fn build_level(
    index: &HierarchyIndex,
    subtree: &Subtree<'_>,
    batch: &SelectedBatch,
    level: Level,
    hierarchy_levels: &[Level],
    scope: TabScope,
) -> Result<Option<RollupLevel>, NodeFailure> {
    // (record, summary key, hierarchy row supplying the display columns)
    let matched: Vec<(&IncentiveRecord, &str, &HierarchyRecord)> = match scope {
        TabScope::Personal => {
            let members = rows_by_member(subtree, level);
            batch
                .records()
                .iter()
                .filter_map(|record| {
                    let (&key, &row) = members.get_key_value(record.rep_id.as_deref()?)?;
                    Some((record, key, row))
                })
                .collect()
        }
        TabScope::Team => {
            let reps = rows_by_member(subtree, Level::Representative);
            let mut vacant = 0usize;
            let matched: Vec<_> = batch
                .records()
                .iter()
                .filter_map(|record| {
                    let row = *reps.get(record.rep_id.as_deref()?)?;
                    match row.at(level) {
                        Some(owner) => Some((record, owner.id.as_str(), row)),
                        None => {
                            vacant += 1;
                            None
                        }
                    }
                })
                .collect();
            if vacant > 0 {
                debug!("{vacant} records skipped on {level} tab: no {level} in their chain");
            }
            matched
        }
    };

    if matched.is_empty() {
        return Ok(None);
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut detail = Vec::with_capacity(matched.len());

    for (record, key, row) in matched {
        let hierarchy: Vec<String> = hierarchy_levels
            .iter()
            .map(|&l| row.name_at(l).to_string())
            .collect();

        let slot = match slots.get(key) {
            Some(&slot) => slot,
            None => {
                groups.push(Group {
                    id: key.to_string(),
                    name: group_name(index, scope, level, key, record, row),
                    hierarchy: hierarchy.clone(),
                    total: Decimal::ZERO,
                    count: 0,
                });
                slots.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.total = group
            .total
            .checked_add(record.payout)
            .ok_or(NodeFailure::Overflow { level })?;
        group.count += 1;

        detail.push(DetailRow {
            hierarchy,
            group_id: key.to_string(),
            record: record.clone(),
        });
    }

    let mut summary: Vec<SummaryRow> = groups
        .into_iter()
        .map(|g| SummaryRow {
            hierarchy: g.hierarchy,
            id: g.id,
            name: g.name,
            total_payout: g.total,
            incentive_count: g.count,
        })
        .collect();

    // Both sorts are stable: ties keep batch encounter order
    summary.sort_by(|a, b| b.total_payout.cmp(&a.total_payout));
    detail.sort_by(|a, b| {
        a.record
            .rep_name
            .cmp(&b.record.rep_name)
            .then_with(|| b.record.payout.cmp(&a.record.payout))
    });

    let tab = RollupLevel {
        level,
        hierarchy_levels: hierarchy_levels.to_vec(),
        summary,
        detail,
    };
    tab.reconcile()?;
    Ok(Some(tab))
}

/// Team groups are named after the manager, personal groups after the earner
fn group_name(
    index: &HierarchyIndex,
    scope: TabScope,
    level: Level,
    key: &str,
    first: &IncentiveRecord,
    row: &HierarchyRecord,
) -> String {
    match scope {
        TabScope::Team if level != Level::Representative => index
            .display_name(level, key)
            .unwrap_or_else(|| row.name_at(level))
            .to_string(),
        _ => first.rep_name.clone(),
    }
}

/// Aggregate every tab for one manager
///
/// `Ok(None)` means the node is not eligible: nobody on its team has a
/// record in the batch.
pub fn aggregate_node(
    index: &HierarchyIndex,
    batch: &SelectedBatch,
    batch_reps: &HashSet<&str>,
    node: &ManagerNode,
    scope: TabScope,
) -> Result<Option<NodeRollup>, NodeAggregationError> {
    let subtree = index.subtree(node);
    let team = subtree.team();
    if !team.intersects(batch_reps) {
        debug!("{} {} has no incentivized team members", node.level, node.id);
        return Ok(None);
    }

    let fail = |failure: NodeFailure| NodeAggregationError {
        level: node.level,
        manager_id: node.id.clone(),
        manager_name: node.name.clone(),
        failure,
    };

    let order = index.order();
    let mut levels = Vec::new();
    for &level in order.below(node.level) {
        let columns = order.between(node.level, level);
        if let Some(tab) = build_level(index, &subtree, batch, level, columns, scope).map_err(&fail)? {
            levels.push(tab);
        }
    }

    if levels.is_empty() {
        return Ok(None);
    }

    let total_payout = checked_total(levels.iter().map(|t| t.summary_payout()))
        .ok_or_else(|| fail(NodeFailure::Overflow { level: node.level }))?;
    let total_people: usize = levels.iter().map(|t| t.summary.len()).sum();

    Ok(Some(NodeRollup {
        node: node.clone(),
        team_size: team.len(),
        levels,
        total_payout,
        total_people,
    }))
}

/// Tabs spanning the whole hierarchy, each with the full chain above its level
pub fn aggregate_whole(
    index: &HierarchyIndex,
    batch: &SelectedBatch,
    scope: TabScope,
) -> Result<Vec<RollupLevel>, NodeFailure> {
    let subtree = index.whole();
    let order = index.order();
    let mut levels = Vec::new();
    for &level in order.reportable_levels() {
        if let Some(tab) = build_level(index, &subtree, batch, level, order.above(level), scope)? {
            levels.push(tab);
        }
    }
    Ok(levels)
}
