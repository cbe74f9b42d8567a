//! Summary and detail rows of one rollup tab

use crate::error::NodeFailure;
use crate::hierarchy::Level;
use crate::ledger::IncentiveRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// One person on a summary tab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Display names for the tab's hierarchy columns, same order as `RollupLevel::hierarchy_levels`
    pub hierarchy: Vec<String>,
    pub id: String,
    pub name: String,
    pub total_payout: Decimal,
    pub incentive_count: usize,
}

/// One ledger line on a detail tab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub hierarchy: Vec<String>,
    /// Identifier of the summary row this line rolls into
    pub group_id: String,
    pub record: IncentiveRecord,
}

/// Summary + detail for one sub-level of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupLevel {
    pub level: Level,
    /// Levels shown as hierarchy columns ahead of the person columns
    pub hierarchy_levels: Vec<Level>,
    pub summary: Vec<SummaryRow>,
    pub detail: Vec<DetailRow>,
}

impl RollupLevel {
    /// Sum of summary totals; only call on a tab that reconciled
    pub fn summary_payout(&self) -> Decimal {
        self.summary.iter().map(|r| r.total_payout).sum()
    }

    pub fn detail_payout(&self) -> Decimal {
        self.detail.iter().map(|r| r.record.payout).sum()
    }

    pub fn summary_count(&self) -> usize {
        self.summary.iter().map(|r| r.incentive_count).sum()
    }

    /// Check that the summary totals are backed by the detail rows
    pub fn reconcile(&self) -> Result<(), NodeFailure> {
        let overflow = NodeFailure::Overflow { level: self.level };
        let summary = checked_total(self.summary.iter().map(|r| r.total_payout)).ok_or(overflow.clone())?;
        let detail = checked_total(self.detail.iter().map(|r| r.record.payout)).ok_or(overflow)?;

        if summary != detail || self.summary_count() != self.detail.len() {
            return Err(NodeFailure::Unreconciled {
                level: self.level,
                summary: format!("{} over {} rows", summary, self.summary_count()),
                detail: format!("{} over {} rows", detail, self.detail.len()),
            });
        }
        Ok(())
    }
}

/// Sum that reports overflow instead of panicking
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}
