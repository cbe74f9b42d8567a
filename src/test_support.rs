//! Shared fixtures for unit tests
//!
//! The sample organization: R1 and R2 report to F1 (Fran One), R3 to F2
//! (Fred Two); both FSMs sit under A1 / D1 / V1. The scenario batch pays
//! R1 $100 and $50, R2 $75 and R3 $200.

use crate::hierarchy::{HierarchyIndex, Level, LevelOrder, DIVISION_POSITION_COLUMN, VALID_DIVISION_POSITIONS};
use crate::ledger::{BatchSelection, IncentiveRecord, SelectedBatch};
use crate::table::{Cell, Table};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn hierarchy_headers() -> Vec<String> {
    let mut headers = vec![Level::Representative.id_column().to_string()];
    for level in [
        Level::FieldSalesManager,
        Level::AreaManager,
        Level::Director,
        Level::VicePresident,
    ] {
        headers.push(level.id_column().to_string());
        headers.push(level.name_column().to_string());
    }
    headers.push(DIVISION_POSITION_COLUMN.to_string());
    headers
}

pub fn sample_hierarchy_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["R1", "F1", "Fran One", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064102"],
        vec!["R2", "F1", "Fran One", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064102"],
        vec!["R3", "F2", "Fred Two", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064095"],
    ]
}

pub fn hierarchy_table(rows: Vec<Vec<&str>>) -> Table {
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(Cell::from).collect())
        .collect();
    Table::new("hierarchy", hierarchy_headers(), rows)
}

pub fn standard_positions() -> Vec<String> {
    VALID_DIVISION_POSITIONS.iter().map(|p| p.to_string()).collect()
}

pub fn sample_index() -> HierarchyIndex {
    HierarchyIndex::build(
        &hierarchy_table(sample_hierarchy_rows()),
        &standard_positions(),
        &LevelOrder::standard(),
    )
    .unwrap()
}

/// A record in batch "B1" of 2024
pub fn record(rep: &str, name: &str, payout: Decimal) -> IncentiveRecord {
    IncentiveRecord {
        incentive_id: None,
        rep_id: Some(rep.to_string()),
        position_id: None,
        territory_id: None,
        rep_name: name.to_string(),
        payout,
        supplier: String::new(),
        description: String::new(),
        sales_role: String::new(),
        channel: String::new(),
        payout_type: String::new(),
        start_date: None,
        end_date: None,
        submitted_by: String::new(),
        tracking_method: String::new(),
        batch_label: "B1".to_string(),
        batch_year: "2024".to_string(),
    }
}

pub fn batch_record(rep: &str, payout: Decimal, label: &str, year: &str) -> IncentiveRecord {
    IncentiveRecord {
        batch_label: label.to_string(),
        batch_year: year.to_string(),
        ..record(rep, rep, payout)
    }
}

pub fn scenario_batch() -> SelectedBatch {
    SelectedBatch::new(
        BatchSelection::new("2024", "B1"),
        vec![
            record("R1", "Ann", dec!(100)),
            record("R1", "Ann", dec!(50)),
            record("R2", "Bea", dec!(75)),
            record("R3", "Cal", dec!(200)),
        ],
    )
}

/// The scenario batch as a raw ledger export, plus one row from another batch
pub fn ledger_table() -> Table {
    let csv = "Incentive #,SalesPersonID,Rep Name,Payout,Paid On Batch,Batch Year,Supplier\n\
               1,R1,Ann,$100.00,03/15/2024,2024.0,Acme\n\
               2,R1,Ann,50,03/15/2024,2024,Acme\n\
               3,R2,Bea,75.00,03/15/2024,2024,Acme\n\
               4,R3,Cal,\"$200.00\",03/15/2024,2024,Acme\n\
               5,R3,Cal,999,04/15/2024,2024,Acme\n";
    Table::from_csv_reader("ledger", csv.as_bytes()).unwrap()
}
