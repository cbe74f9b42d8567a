//! Rendering rollup tabs into header/row grids for the spreadsheet writer

use super::naming::sheet_title;
use crate::hierarchy::Level;
use crate::ledger::columns;
use crate::rollup::RollupLevel;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub const SUMMARY_COLUMNS: [&str; 4] = ["ID", "Name", "Total Payout", "Incentive Count"];

/// One rendered sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTab {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// `$1,234.50`, with a leading minus for negatives
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

fn hierarchy_headers(levels: &[Level]) -> Vec<String> {
    levels.iter().map(|l| l.column_label().to_string()).collect()
}

/// Append `extra` to `headers`, skipping names already present
fn extend_unique(headers: &mut Vec<String>, extra: &[&str]) -> Vec<bool> {
    extra
        .iter()
        .map(|&name| {
            if headers.iter().any(|h| h == name) {
                false
            } else {
                headers.push(name.to_string());
                true
            }
        })
        .collect()
}

/// "{label} Summary" sheet: hierarchy columns first, then the person columns
pub fn summary_tab(tab: &RollupLevel) -> ReportTab {
    let mut headers = hierarchy_headers(&tab.hierarchy_levels);
    let keep = extend_unique(&mut headers, &SUMMARY_COLUMNS);

    let rows = tab
        .summary
        .iter()
        .map(|row| {
            let cells = [
                row.id.clone(),
                row.name.clone(),
                format_currency(row.total_payout),
                row.incentive_count.to_string(),
            ];
            row.hierarchy
                .iter()
                .cloned()
                .chain(cells.into_iter().zip(&keep).filter(|(_, k)| **k).map(|(c, _)| c))
                .collect()
        })
        .collect();

    ReportTab {
        title: sheet_title(&format!("{} Summary", tab.level.tab_label())),
        headers,
        rows,
    }
}

/// "{label} Detail" sheet: hierarchy columns first, then every ledger column
pub fn detail_tab(tab: &RollupLevel) -> ReportTab {
    let mut headers = hierarchy_headers(&tab.hierarchy_levels);
    let keep = extend_unique(&mut headers, &columns::DETAIL);
    let payout_at = columns::DETAIL
        .iter()
        .position(|&c| c == columns::PAYOUT);

    let rows = tab
        .detail
        .iter()
        .map(|row| {
            let mut cells = row.record.detail_cells();
            if let Some(i) = payout_at {
                cells[i] = format_currency(row.record.payout);
            }
            row.hierarchy
                .iter()
                .cloned()
                .chain(cells.into_iter().zip(&keep).filter(|(_, k)| **k).map(|(c, _)| c))
                .collect()
        })
        .collect();

    ReportTab {
        title: sheet_title(&format!("{} Detail", tab.level.tab_label())),
        headers,
        rows,
    }
}

/// Summary then detail sheet for every tab, in level order
pub fn render_tabs(levels: &[RollupLevel]) -> Vec<ReportTab> {
    levels
        .iter()
        .flat_map(|tab| [summary_tab(tab), detail_tab(tab)])
        .collect()
}
