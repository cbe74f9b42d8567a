//! Incentive ledger loading, batch selection and per-rep statements

mod batch;
mod record;
mod statement;

pub use batch::{available_years, batches_for_year, select_batch, BatchSelection, BatchStats, SelectedBatch};
pub use record::{columns, parse_amount, parse_date, IncentiveRecord, Ledger, LedgerStats};
pub use statement::{split_by_representative, RepStatement};
