//! Per-manager and master report structures

use super::naming::{report_file_stem, MASTER_FILE_STEM};
use super::tab::{format_currency, render_tabs, ReportTab};
use crate::hierarchy::ManagerNode;
use crate::rollup::{NodeRollup, RollupLevel};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metric/value pair on a report's front sheet
pub type MetadataRow = (&'static str, String);

/// Rollup report for one manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerReport {
    pub node: ManagerNode,
    pub batch_period: String,
    pub total_people: usize,
    pub total_payout: Decimal,
    pub generated_at: DateTime<Utc>,
    pub levels: Vec<RollupLevel>,
}

impl ManagerReport {
    pub fn new(rollup: NodeRollup, batch_period: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            node: rollup.node,
            batch_period: batch_period.into(),
            total_people: rollup.total_people,
            total_payout: rollup.total_payout,
            generated_at,
            levels: rollup.levels,
        }
    }

    pub fn metadata(&self) -> Vec<MetadataRow> {
        vec![
            ("Manager Level", self.node.level.code().to_string()),
            ("Manager ID", self.node.id.clone()),
            ("Manager Name", self.node.name.clone()),
            ("Batch Period", self.batch_period.clone()),
            ("Total People with Incentives", self.total_people.to_string()),
            ("Total Payout", format_currency(self.total_payout)),
            ("Report Generated", self.generated_at.format(TIMESTAMP_FORMAT).to_string()),
        ]
    }

    pub fn tabs(&self) -> Vec<ReportTab> {
        render_tabs(&self.levels)
    }

    pub fn file_stem(&self) -> String {
        report_file_stem(self.node.level, &self.node.id, &self.node.name)
    }
}

/// Cross-level summary over the whole hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterReport {
    pub batch_period: String,
    /// Distinct representatives in the batch
    pub total_people: usize,
    /// Whole batch, including records that never reached a rollup
    pub total_payout: Decimal,
    pub generated_at: DateTime<Utc>,
    pub levels: Vec<RollupLevel>,
}

impl MasterReport {
    pub fn metadata(&self) -> Vec<MetadataRow> {
        vec![
            ("Report Type", "Master Management Summary".to_string()),
            ("Batch Period", self.batch_period.clone()),
            ("Total People with Incentives", self.total_people.to_string()),
            ("Total Payout", format_currency(self.total_payout)),
            ("Report Generated", self.generated_at.format(TIMESTAMP_FORMAT).to_string()),
        ]
    }

    pub fn tabs(&self) -> Vec<ReportTab> {
        render_tabs(&self.levels)
    }

    pub fn file_stem(&self) -> &'static str {
        MASTER_FILE_STEM
    }
}
