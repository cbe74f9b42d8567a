//! Per-representative statements for individual distribution

use super::batch::SelectedBatch;
use super::record::IncentiveRecord;
use crate::report::naming::sanitize_component;
use crate::rollup::checked_total;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything one representative earned in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepStatement {
    pub rep_id: String,
    pub rep_name: String,
    /// `None` when the representative's payouts overflow the decimal range
    pub payout: Option<Decimal>,
    pub records: Vec<IncentiveRecord>,
}

impl RepStatement {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// `ID_Name_Batch_Year`, safe for a file name
    pub fn file_stem(&self, batch: &SelectedBatch) -> String {
        let selection = batch.selection();
        format!(
            "{}_{}_{}_{}",
            self.rep_id,
            sanitize_component(&self.rep_name),
            sanitize_component(&selection.batch_label),
            selection.year_prefix()
        )
    }
}

/// Split a batch into one statement per representative, ordered by identifier
///
/// Records without a representative identifier belong to nobody and are skipped.
pub fn split_by_representative(batch: &SelectedBatch) -> Vec<RepStatement> {
    let mut grouped: BTreeMap<&str, Vec<&IncentiveRecord>> = BTreeMap::new();
    for record in batch.records() {
        if let Some(id) = record.rep_id.as_deref() {
            grouped.entry(id).or_default().push(record);
        }
    }

    grouped
        .into_iter()
        .map(|(id, records)| RepStatement {
            rep_id: id.to_string(),
            rep_name: records
                .first()
                .map(|r| r.rep_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            payout: checked_total(records.iter().map(|r| r.payout)),
            records: records.into_iter().cloned().collect(),
        })
        .collect()
}
