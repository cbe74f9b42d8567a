//! End-to-end batch run
//!
//! Loading happens up front and fails fast; everything after index and batch
//! are frozen is pure computation whose non-fatal problems come back inside
//! the `RunOutput`.

use crate::config::EngineConfig;
use crate::coverage::{
    hierarchy_coverage, manager_coverage, representative_coverage, ContactDirectory, CoverageReport,
    HierarchyCoverage,
};
use crate::error::EngineResult;
use crate::hierarchy::{DropStats, HierarchyIndex};
use crate::ledger::{select_batch, split_by_representative, BatchStats, Ledger, RepStatement, SelectedBatch};
use crate::report::{assemble, format_currency, ReportSet};
use crate::rollup::rollup_all;
use crate::table::Table;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// Non-fatal conditions worth surfacing to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    /// No ledger record matched the selected batch
    EmptySelection { period: String },
    DroppedHierarchyRows(DropStats),
    /// Payout cells loaded as zero
    InvalidPayouts(usize),
    /// Batch representatives with no hierarchy row
    UnmatchedRepresentatives(usize),
    /// The batch total does not fit in a decimal
    PayoutOverflow,
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunWarning::EmptySelection { period } => write!(f, "no ledger records for batch {period}"),
            RunWarning::DroppedHierarchyRows(stats) => write!(
                f,
                "{} hierarchy rows dropped ({} invalid position, {} unassigned, {} unusable ids)",
                stats.total(),
                stats.invalid_position,
                stats.unassigned_first_line,
                stats.integrity
            ),
            RunWarning::InvalidPayouts(n) => write!(f, "{n} ledger payouts unreadable, counted as zero"),
            RunWarning::UnmatchedRepresentatives(n) => {
                write!(f, "{n} batch representatives are not in the hierarchy")
            }
            RunWarning::PayoutOverflow => write!(f, "batch payout total overflows the decimal range"),
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub batch: SelectedBatch,
    pub stats: BatchStats,
    pub statements: Vec<RepStatement>,
    pub reports: ReportSet,
    pub hierarchy_coverage: HierarchyCoverage,
    /// Present when a contact directory was supplied
    pub representative_coverage: Option<CoverageReport>,
    pub manager_coverage: Option<CoverageReport>,
    pub warnings: Vec<RunWarning>,
}

impl RunOutput {
    /// Operator-facing summary of the run, one line per figure
    pub fn summary_lines(&self) -> Vec<String> {
        let selection = self.batch.selection();
        let total = match self.stats.total_payout {
            Some(total) => format_currency(total),
            None => "overflow".to_string(),
        };
        let mut lines = vec![
            format!("Batch {} ({})", selection.period(), selection.display_month()),
            format!(
                "  Records: {} | Unique Reps: {} | Total Payout: {}",
                self.stats.records, self.stats.unique_reps, total
            ),
            format!(
                "  Hierarchy coverage: {} of {} matched ({:.1}%), {} unmatched",
                self.hierarchy_coverage.matched.len(),
                self.hierarchy_coverage.submitted(),
                self.hierarchy_coverage.pct_matched(),
                self.hierarchy_coverage.unmatched.len()
            ),
            format!("  Manager reports: {}", self.reports.manager_reports.len()),
            format!("  Rep statements:  {}", self.statements.len()),
        ];
        for (label, coverage) in [
            ("Rep emails", &self.representative_coverage),
            ("Manager emails", &self.manager_coverage),
        ] {
            if let Some(c) = coverage {
                lines.push(format!(
                    "  {}: {} of {} matched, {} invalid, {} missing",
                    label,
                    c.matched(),
                    c.submitted(),
                    c.invalid(),
                    c.missing()
                ));
            }
        }
        for failure in &self.reports.failures {
            lines.push(format!("  FAILED {}", failure));
        }
        if let Some(failure) = &self.reports.master_failure {
            lines.push(format!("  FAILED master report: {}", failure));
        }
        for warning in &self.warnings {
            lines.push(format!("  warning: {}", warning));
        }
        lines
    }
}

/// Rollup engine bound to one hierarchy and one configuration
#[derive(Debug, Clone)]
pub struct RollupEngine {
    index: HierarchyIndex,
    config: EngineConfig,
}

impl RollupEngine {
    /// Build the hierarchy index; schema problems fail here
    pub fn new(hierarchy: &Table, config: EngineConfig) -> EngineResult<Self> {
        let index = HierarchyIndex::build(hierarchy, &config.valid_positions, &config.levels)?;
        Ok(Self { index, config })
    }

    pub fn index(&self) -> &HierarchyIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the configured batch through selection, rollup, assembly and coverage
    pub fn run(
        &self,
        ledger: &Ledger,
        directory: Option<&ContactDirectory>,
        generated_at: DateTime<Utc>,
    ) -> EngineResult<RunOutput> {
        self.config.validate()?;
        let mut warnings = Vec::new();

        let dropped = self.index.dropped();
        if dropped.total() > 0 {
            warnings.push(RunWarning::DroppedHierarchyRows(dropped));
        }
        if ledger.stats().invalid_payouts > 0 {
            warnings.push(RunWarning::InvalidPayouts(ledger.stats().invalid_payouts));
        }

        let batch = select_batch(ledger, &self.config.selection);
        if batch.is_empty() {
            warnings.push(RunWarning::EmptySelection {
                period: self.config.selection.period(),
            });
        }
        let stats = batch.stats();
        match stats.total_payout {
            Some(total) => info!(
                "Batch {}: {} records, {} representatives, total {}",
                self.config.selection.period(),
                stats.records,
                stats.unique_reps,
                total
            ),
            None => warnings.push(RunWarning::PayoutOverflow),
        }

        let coverage = hierarchy_coverage(&batch, &self.index);
        if !coverage.unmatched.is_empty() {
            warnings.push(RunWarning::UnmatchedRepresentatives(coverage.unmatched.len()));
        }

        let statements = split_by_representative(&batch);
        let scope = self.config.tab_scope;
        let run = rollup_all(&self.index, &batch, scope);
        let reports = assemble(&self.index, &batch, run, scope, generated_at);

        let (rep_coverage, mgr_coverage) = match directory {
            Some(directory) => (
                Some(representative_coverage(&statements, &batch, directory)),
                Some(manager_coverage(&reports.manager_reports, directory)),
            ),
            None => (None, None),
        };

        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(RunOutput {
            batch,
            stats,
            statements,
            reports,
            hierarchy_coverage: coverage,
            representative_coverage: rep_coverage,
            manager_coverage: mgr_coverage,
            warnings,
        })
    }
}
