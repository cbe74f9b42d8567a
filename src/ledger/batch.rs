//! Batch selection and the batch catalog
//!
//! A batch is one payout cycle, addressed by (year, batch label). Years are
//! matched by prefix because exports write the same year as `2024` or
//! `2024.0`; labels are matched exactly.

use super::record::{IncentiveRecord, Ledger};
use crate::rollup::checked_total;
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The user's (year, batch label) choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSelection {
    pub year: String,
    pub batch_label: String,
}

impl BatchSelection {
    pub fn new(year: impl Into<String>, batch_label: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            batch_label: batch_label.into(),
        }
    }

    /// Year with any decimal artifact removed
    pub fn year_prefix(&self) -> &str {
        year_prefix(&self.year)
    }

    /// "03/15/2024 2024" style period label used in report metadata
    pub fn period(&self) -> String {
        format!("{} {}", self.batch_label, self.year_prefix())
    }

    pub fn matches(&self, record: &IncentiveRecord) -> bool {
        record.batch_year.starts_with(self.year_prefix()) && record.batch_label == self.batch_label
    }

    /// Month name of the batch label, or the label itself when it is not a date
    pub fn display_month(&self) -> String {
        let normalized = self.batch_label.replace('-', "/");
        normalized
            .split('/')
            .next()
            .and_then(|m| m.trim().parse::<usize>().ok())
            .filter(|m| (1..=12).contains(m))
            .map(|m| MONTH_NAMES[m - 1].to_string())
            .unwrap_or_else(|| self.batch_label.clone())
    }
}

fn year_prefix(year: &str) -> &str {
    year.trim().split('.').next().unwrap_or_default()
}

/// Preview figures for a selected batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub records: usize,
    pub unique_reps: usize,
    /// `None` when the payouts overflow the decimal range
    pub total_payout: Option<Decimal>,
}

/// The ledger rows of one batch, in source order
#[derive(Debug, Clone)]
pub struct SelectedBatch {
    selection: BatchSelection,
    records: Vec<IncentiveRecord>,
}

impl SelectedBatch {
    pub fn new(selection: BatchSelection, records: Vec<IncentiveRecord>) -> Self {
        Self { selection, records }
    }

    pub fn selection(&self) -> &BatchSelection {
        &self.selection
    }

    pub fn records(&self) -> &[IncentiveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct representative identifiers with at least one record
    pub fn rep_ids(&self) -> HashSet<&str> {
        self.records
            .iter()
            .filter_map(|r| r.rep_id.as_deref())
            .collect()
    }

    /// Batch total, `None` on decimal overflow
    pub fn total_payout(&self) -> Option<Decimal> {
        checked_total(self.records.iter().map(|r| r.payout))
    }

    pub fn stats(&self) -> BatchStats {
        BatchStats {
            records: self.records.len(),
            unique_reps: self.rep_ids().len(),
            total_payout: self.total_payout(),
        }
    }
}

/// Pick the records of one batch out of the ledger
///
/// An empty result is a valid outcome and is returned as such.
pub fn select_batch(ledger: &Ledger, selection: &BatchSelection) -> SelectedBatch {
    let records: Vec<IncentiveRecord> = ledger
        .records()
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();

    if records.is_empty() {
        warn!(
            "No ledger records for batch '{}' in year {}",
            selection.batch_label,
            selection.year_prefix()
        );
    } else {
        info!(
            "Selected {} of {} ledger records for batch {}",
            records.len(),
            ledger.len(),
            selection.period()
        );
    }

    SelectedBatch::new(selection.clone(), records)
}

/// Distinct batch years, newest first
pub fn available_years(ledger: &Ledger) -> Vec<String> {
    let years: BTreeSet<String> = ledger
        .records()
        .iter()
        .map(|r| year_prefix(&r.batch_year).to_string())
        .filter(|y| !y.is_empty())
        .collect();

    let mut years: Vec<String> = years.into_iter().collect();
    years.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x),
        _ => b.cmp(a),
    });
    years
}

/// Distinct batch labels paid in `year`, sorted
pub fn batches_for_year(ledger: &Ledger, year: &str) -> Vec<String> {
    let prefix = year_prefix(year);
    let labels: BTreeSet<&str> = ledger
        .records()
        .iter()
        .filter(|r| r.batch_year.starts_with(prefix))
        .map(|r| r.batch_label.as_str())
        .filter(|l| !l.is_empty())
        .collect();
    labels.into_iter().map(|l| l.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::batch_record;
    use rust_decimal_macros::dec;

    fn ledger() -> Ledger {
        Ledger::new(vec![
            batch_record("R1", dec!(100), "03/15/2024", "2024"),
            batch_record("R2", dec!(75), "03/15/2024", "2024.0"),
            batch_record("R1", dec!(20), "04/15/2024", "2024"),
            batch_record("R3", dec!(200), "03/15/2024", "2023"),
            batch_record("R4", dec!(5), "03/15/2024 ", "2024"),
        ])
    }

    #[test]
    fn test_select_prefix_year_exact_label() {
        let batch = select_batch(&ledger(), &BatchSelection::new("2024", "03/15/2024"));

        assert_eq!(batch.len(), 2);
        for record in batch.records() {
            assert!(record.batch_year.starts_with("2024"));
            assert_eq!(record.batch_label, "03/15/2024");
        }
        // Source order preserved
        assert_eq!(batch.records()[0].rep_id.as_deref(), Some("R1"));
        assert_eq!(batch.records()[1].rep_id.as_deref(), Some("R2"));
    }

    #[test]
    fn test_selected_year_with_decimal_artifact() {
        let batch = select_batch(&ledger(), &BatchSelection::new("2024.0", "03/15/2024"));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let batch = select_batch(&ledger(), &BatchSelection::new("1999", "03/15/2024"));
        assert!(batch.is_empty());
        let stats = batch.stats();
        assert_eq!(stats.records, 0);
        assert_eq!(stats.unique_reps, 0);
        assert_eq!(stats.total_payout, Some(Decimal::ZERO));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selection = BatchSelection::new("2024", "03/15/2024");
        let a = select_batch(&ledger(), &selection);
        let b = select_batch(&ledger(), &selection);
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn test_stats() {
        let batch = select_batch(&ledger(), &BatchSelection::new("2024", "03/15/2024"));
        let stats = batch.stats();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.unique_reps, 2);
        assert_eq!(stats.total_payout, Some(dec!(175)));
    }

    #[test]
    fn test_stats_total_overflow_is_none() {
        let batch = SelectedBatch::new(
            BatchSelection::new("2024", "03/15/2024"),
            vec![
                batch_record("R1", Decimal::MAX, "03/15/2024", "2024"),
                batch_record("R2", Decimal::MAX, "03/15/2024", "2024"),
            ],
        );
        let stats = batch.stats();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.total_payout, None);
    }

    #[test]
    fn test_catalog() {
        let ledger = ledger();
        assert_eq!(available_years(&ledger), vec!["2024", "2023"]);
        assert_eq!(
            batches_for_year(&ledger, "2024"),
            vec!["03/15/2024", "03/15/2024 ", "04/15/2024"]
        );
    }

    #[test]
    fn test_display_month() {
        assert_eq!(BatchSelection::new("2024", "03/15/2024").display_month(), "March");
        assert_eq!(BatchSelection::new("2024", "12-01-2024").display_month(), "December");
        assert_eq!(BatchSelection::new("2024", "Q1 bonus").display_month(), "Q1 bonus");
        assert_eq!(BatchSelection::new("2024", "13/01/2024").display_month(), "13/01/2024");
    }

    #[test]
    fn test_period() {
        assert_eq!(BatchSelection::new("2024.0", "B1").period(), "B1 2024");
    }
}
