//! Incentive ledger records and their loader

use crate::error::EngineResult;
use crate::identity::normalize_id;
use crate::table::{Cell, Table};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// Ledger column names
pub mod columns {
    pub const INCENTIVE_ID: &str = "Incentive #";
    pub const REP_ID: &str = "SalesPersonID";
    pub const POSITION_ID: &str = "Position ID";
    pub const TERRITORY_ID: &str = "Territory ID";
    pub const REP_NAME: &str = "Rep Name";
    pub const PAYOUT: &str = "Payout";
    pub const SUPPLIER: &str = "Supplier";
    pub const DESCRIPTION: &str = "Desc";
    pub const SALES_ROLE: &str = "Sales Role";
    pub const CHANNEL: &str = "Channel";
    pub const PAYOUT_TYPE: &str = "Payout Type";
    pub const START_DATE: &str = "Start Date";
    pub const END_DATE: &str = "End Date";
    pub const SUBMITTED_BY: &str = "Submitted By";
    pub const TRACKING_METHOD: &str = "Tracking Method";
    pub const BATCH_LABEL: &str = "Paid On Batch";
    pub const BATCH_YEAR: &str = "Batch Year";

    /// Columns the engine cannot work without
    pub const REQUIRED: [&str; 6] = [INCENTIVE_ID, REP_ID, REP_NAME, PAYOUT, BATCH_LABEL, BATCH_YEAR];

    /// Detail columns in report order
    pub const DETAIL: [&str; 17] = [
        INCENTIVE_ID,
        REP_ID,
        POSITION_ID,
        TERRITORY_ID,
        REP_NAME,
        PAYOUT,
        SUPPLIER,
        DESCRIPTION,
        SALES_ROLE,
        CHANNEL,
        PAYOUT_TYPE,
        START_DATE,
        END_DATE,
        SUBMITTED_BY,
        TRACKING_METHOD,
        BATCH_LABEL,
        BATCH_YEAR,
    ];
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// One earned incentive line item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncentiveRecord {
    pub incentive_id: Option<String>,
    pub rep_id: Option<String>,
    pub position_id: Option<String>,
    pub territory_id: Option<String>,
    pub rep_name: String,
    pub payout: Decimal,
    pub supplier: String,
    pub description: String,
    pub sales_role: String,
    pub channel: String,
    pub payout_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub submitted_by: String,
    pub tracking_method: String,
    pub batch_label: String,
    pub batch_year: String,
}

impl IncentiveRecord {
    /// Cells in `columns::DETAIL` order
    pub fn detail_cells(&self) -> Vec<String> {
        let date = |d: &Option<NaiveDate>| d.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default();
        vec![
            self.incentive_id.clone().unwrap_or_default(),
            self.rep_id.clone().unwrap_or_default(),
            self.position_id.clone().unwrap_or_default(),
            self.territory_id.clone().unwrap_or_default(),
            self.rep_name.clone(),
            self.payout.to_string(),
            self.supplier.clone(),
            self.description.clone(),
            self.sales_role.clone(),
            self.channel.clone(),
            self.payout_type.clone(),
            date(&self.start_date),
            date(&self.end_date),
            self.submitted_by.clone(),
            self.tracking_method.clone(),
            self.batch_label.clone(),
            self.batch_year.clone(),
        ]
    }
}

/// Counters collected while loading the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    /// Payout cells that could not be read as money; loaded as zero
    pub invalid_payouts: usize,
    /// Rows without a representative identifier
    pub missing_representative: usize,
}

/// The full incentive ledger
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<IncentiveRecord>,
    stats: LedgerStats,
}

impl Ledger {
    pub fn new(records: Vec<IncentiveRecord>) -> Self {
        Self {
            records,
            stats: LedgerStats::default(),
        }
    }

    /// Load the ledger from a raw table, validating its schema first
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        table.require_columns(&columns::REQUIRED)?;

        let col = |name: &str| table.find_column(name);
        let incentive_col = col(columns::INCENTIVE_ID);
        let rep_col = col(columns::REP_ID);
        let position_col = col(columns::POSITION_ID);
        let territory_col = col(columns::TERRITORY_ID);
        let name_col = col(columns::REP_NAME);
        let payout_col = col(columns::PAYOUT);
        let supplier_col = col(columns::SUPPLIER);
        let desc_col = col(columns::DESCRIPTION);
        let role_col = col(columns::SALES_ROLE);
        let channel_col = col(columns::CHANNEL);
        let payout_type_col = col(columns::PAYOUT_TYPE);
        let start_col = col(columns::START_DATE);
        let end_col = col(columns::END_DATE);
        let submitted_col = col(columns::SUBMITTED_BY);
        let tracking_col = col(columns::TRACKING_METHOD);
        let label_col = col(columns::BATCH_LABEL);
        let year_col = col(columns::BATCH_YEAR);

        let mut stats = LedgerStats::default();
        let mut records = Vec::with_capacity(table.len());

        for (row_no, row) in table.rows().iter().enumerate() {
            let id = |c: Option<usize>| c.and_then(|c| normalize_id(&row[c]));
            let text = |c: Option<usize>| c.and_then(|c| row[c].text()).unwrap_or_default();
            let date = |c: Option<usize>| c.and_then(|c| parse_date(&row[c]));

            let payout = match payout_col.map(|c| parse_amount(&row[c])) {
                Some(Some(amount)) => amount,
                _ => {
                    warn!("ledger row {}: unreadable payout, counted as zero", row_no + 2);
                    stats.invalid_payouts += 1;
                    Decimal::ZERO
                }
            };

            let rep_id = id(rep_col);
            if rep_id.is_none() {
                stats.missing_representative += 1;
            }

            records.push(IncentiveRecord {
                incentive_id: id(incentive_col),
                rep_id,
                position_id: id(position_col),
                territory_id: id(territory_col),
                rep_name: text(name_col),
                payout,
                supplier: text(supplier_col),
                description: text(desc_col),
                sales_role: text(role_col),
                channel: text(channel_col),
                payout_type: text(payout_type_col),
                start_date: date(start_col),
                end_date: date(end_col),
                submitted_by: text(submitted_col),
                tracking_method: text(tracking_col),
                batch_label: text(label_col),
                batch_year: text(year_col),
            });
        }

        info!(
            "Loaded {} ledger records ({} invalid payouts, {} without representative)",
            records.len(),
            stats.invalid_payouts,
            stats.missing_representative
        );

        Ok(Self { records, stats })
    }

    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        Self::from_table(&Table::from_csv_path(path)?)
    }

    pub fn records(&self) -> &[IncentiveRecord] {
        &self.records
    }

    pub fn stats(&self) -> LedgerStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read a money cell: `1234.5`, `$1,234.50`, `(12.00)`; blank is zero
pub fn parse_amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Empty => Some(Decimal::ZERO),
        Cell::Int(value) => Some(Decimal::from(*value)),
        Cell::Float(value) if value.is_nan() => Some(Decimal::ZERO),
        Cell::Float(value) => Decimal::try_from(*value).ok(),
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Some(Decimal::ZERO);
            }
            let (negative, body) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
                Some(inner) => (true, inner),
                None => (false, trimmed),
            };
            let cleaned: String = body
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            let amount = Decimal::from_str(&cleaned).ok()?;
            Some(if negative { -amount } else { amount })
        }
    }
}

/// Read a date cell in any of the export formats
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    let text = cell.text()?;
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(stamp.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&"$1,234.50".into()), Some(dec!(1234.50)));
        assert_eq!(parse_amount(&"(12.00)".into()), Some(dec!(-12.00)));
        assert_eq!(parse_amount(&Cell::Empty), Some(Decimal::ZERO));
        assert_eq!(parse_amount(&Cell::Int(75)), Some(dec!(75)));
        assert_eq!(parse_amount(&Cell::Float(0.5)), Some(dec!(0.5)));
        assert_eq!(parse_amount(&"n/a".into()), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date(&"2024-03-15".into()), expected);
        assert_eq!(parse_date(&"03/15/2024".into()), expected);
        assert_eq!(parse_date(&"2024-03-15 00:00:00".into()), expected);
        assert_eq!(parse_date(&"someday".into()), None);
    }

    #[test]
    fn test_loads_ledger_with_normalized_ids() {
        let csv = "Incentive #,SalesPersonID,Rep Name,Payout,Paid On Batch,Batch Year,Start Date\n\
                   9001.0,101.0,Ann,$10.00,03/15/2024,2024.0,2024-01-01\n\
                   9002,,Bob,oops,03/15/2024,2024,\n";
        let table = Table::from_csv_reader("ledger", csv.as_bytes()).unwrap();
        let ledger = Ledger::from_table(&table).unwrap();

        assert_eq!(ledger.len(), 2);
        let first = &ledger.records()[0];
        assert_eq!(first.incentive_id.as_deref(), Some("9001"));
        assert_eq!(first.rep_id.as_deref(), Some("101"));
        assert_eq!(first.payout, dec!(10.00));
        assert_eq!(first.batch_year, "2024.0");
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(first.supplier, "");

        assert_eq!(ledger.stats().invalid_payouts, 1);
        assert_eq!(ledger.stats().missing_representative, 1);
        assert_eq!(ledger.records()[1].payout, Decimal::ZERO);
    }

    #[test]
    fn test_missing_required_column() {
        let table = Table::from_csv_reader("ledger", "SalesPersonID,Payout\n1,2\n".as_bytes()).unwrap();
        assert!(matches!(
            Ledger::from_table(&table),
            Err(crate::error::EngineError::Schema { .. })
        ));
    }

    #[test]
    fn test_detail_cells_follow_column_order() {
        let record = crate::test_support::record("R1", "Ann", dec!(12.5));
        let cells = record.detail_cells();
        assert_eq!(cells.len(), columns::DETAIL.len());
        assert_eq!(cells[1], "R1");
        assert_eq!(cells[5], "12.5");
    }
}
