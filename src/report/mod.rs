//! Report assembly
//!
//! Turns node rollups into per-manager reports and builds the master report
//! over the whole hierarchy. Rendering to a spreadsheet is left to the
//! caller; `ReportTab` is the header/row grid it writes.

mod manager;
pub mod naming;
mod tab;

pub use manager::{ManagerReport, MasterReport, MetadataRow};
pub use tab::{detail_tab, format_currency, render_tabs, summary_tab, ReportTab, SUMMARY_COLUMNS};

use crate::error::{NodeAggregationError, NodeFailure};
use crate::hierarchy::HierarchyIndex;
use crate::ledger::SelectedBatch;
use crate::rollup::{aggregate_whole, RollupRun, TabScope};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

/// Every report produced for one batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSet {
    pub manager_reports: Vec<ManagerReport>,
    /// `None` when nothing in the batch reached a reportable level, or the master failed
    pub master: Option<MasterReport>,
    #[serde(skip)]
    pub failures: Vec<NodeAggregationError>,
    #[serde(skip)]
    pub master_failure: Option<NodeFailure>,
}

impl ReportSet {
    pub fn is_empty(&self) -> bool {
        self.manager_reports.is_empty() && self.master.is_none()
    }
}

/// Build the master report
///
/// Returns `Ok(None)` when no batch record matched any reportable level.
pub fn build_master(
    index: &HierarchyIndex,
    batch: &SelectedBatch,
    scope: TabScope,
    generated_at: DateTime<Utc>,
) -> Result<Option<MasterReport>, NodeFailure> {
    let levels = aggregate_whole(index, batch, scope)?;
    if levels.is_empty() {
        return Ok(None);
    }
    let total_payout = crate::rollup::checked_total(batch.records().iter().map(|r| r.payout))
        .ok_or(NodeFailure::Overflow {
            level: index.order().first_line(),
        })?;

    Ok(Some(MasterReport {
        batch_period: batch.selection().period(),
        total_people: batch.rep_ids().len(),
        total_payout,
        generated_at,
        levels,
    }))
}

/// Assemble per-manager reports from a rollup run, plus the master report
pub fn assemble(
    index: &HierarchyIndex,
    batch: &SelectedBatch,
    run: RollupRun,
    scope: TabScope,
    generated_at: DateTime<Utc>,
) -> ReportSet {
    let period = batch.selection().period();
    let manager_reports: Vec<ManagerReport> = run
        .rollups
        .into_iter()
        .map(|rollup| ManagerReport::new(rollup, period.clone(), generated_at))
        .collect();

    let (master, master_failure) = match build_master(index, batch, scope, generated_at) {
        Ok(master) => (master, None),
        Err(failure) => {
            warn!("Master report failed: {}", failure);
            (None, Some(failure))
        }
    };

    info!(
        "Assembled {} manager reports{}",
        manager_reports.len(),
        if master.is_some() { " and the master report" } else { "" }
    );

    ReportSet {
        manager_reports,
        master,
        failures: run.failures,
        master_failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Level;
    use crate::ledger::BatchSelection;
    use crate::rollup::rollup_all;
    use crate::test_support::{record, sample_index, scenario_batch};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    fn reports(scope: TabScope) -> ReportSet {
        let index = sample_index();
        let batch = scenario_batch();
        let run = rollup_all(&index, &batch, scope);
        assemble(&index, &batch, run, scope, at())
    }

    #[test]
    fn test_manager_metadata() {
        let set = reports(TabScope::Team);
        let area = set
            .manager_reports
            .iter()
            .find(|r| r.node.level == Level::AreaManager)
            .unwrap();

        let metadata = area.metadata();
        assert_eq!(metadata[0], ("Manager Level", "AM".to_string()));
        assert_eq!(metadata[1], ("Manager ID", "A1".to_string()));
        assert_eq!(metadata[2], ("Manager Name", "Alex Area".to_string()));
        assert_eq!(metadata[3], ("Batch Period", "B1 2024".to_string()));
        assert_eq!(metadata[4], ("Total People with Incentives", "5".to_string()));
        assert_eq!(metadata[5], ("Total Payout", "$850.00".to_string()));
        assert_eq!(metadata[6], ("Report Generated", "2024-03-15 09:30:00".to_string()));
        assert_eq!(area.file_stem(), "AM_A1_Alex Area");
    }

    #[test]
    fn test_master_report() {
        let set = reports(TabScope::Personal);
        let master = set.master.unwrap();

        assert_eq!(master.total_people, 3);
        assert_eq!(master.total_payout, dec!(425));
        assert_eq!(master.file_stem(), "_MANAGEMENT_SUMMARY");
        assert_eq!(master.metadata()[0].1, "Master Management Summary");

        let reps = master.levels.last().unwrap();
        assert_eq!(reps.level, Level::Representative);
        assert_eq!(reps.hierarchy_levels.len(), 4);
        let titles: Vec<String> = master.tabs().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Rep Summary", "Rep Detail"]);
    }

    #[test]
    fn test_master_totals_include_reps_outside_hierarchy() {
        let index = sample_index();
        let mut records = scenario_batch().records().to_vec();
        records.push(record("GHOST", "Nobody", dec!(5)));
        let batch = SelectedBatch::new(BatchSelection::new("2024", "B1"), records);

        let master = build_master(&index, &batch, TabScope::Team, at()).unwrap().unwrap();
        assert_eq!(master.total_payout, dec!(430));
        assert_eq!(master.total_people, 4);
        assert_eq!(master.levels.last().unwrap().summary_payout(), dec!(425));
    }

    #[test]
    fn test_empty_batch_yields_no_reports() {
        let index = sample_index();
        let batch = SelectedBatch::new(BatchSelection::new("2024", "B9"), vec![]);
        let run = rollup_all(&index, &batch, TabScope::Personal);
        let set = assemble(&index, &batch, run, TabScope::Personal, at());
        assert!(set.is_empty());
        assert!(set.master_failure.is_none());
    }

    #[test]
    fn test_failures_are_carried_forward() {
        let index = sample_index();
        let batch = SelectedBatch::new(
            BatchSelection::new("2024", "B1"),
            vec![record("R1", "Ann", Decimal::MAX), record("R1", "Ann", dec!(1))],
        );
        let run = rollup_all(&index, &batch, TabScope::Team);
        let set = assemble(&index, &batch, run, TabScope::Team, at());

        assert_eq!(set.failures.len(), 4);
        assert!(set.manager_reports.is_empty());
        assert!(set.master.is_none());
        assert!(matches!(set.master_failure, Some(NodeFailure::Overflow { .. })));
    }
}
