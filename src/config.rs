//! Engine configuration
//!
//! Everything that varies between runs lives here: the batch to roll up, the
//! division position allow-list, the level ordering and the tab scope.

use crate::error::{EngineError, EngineResult};
use crate::hierarchy::{LevelOrder, VALID_DIVISION_POSITIONS};
use crate::ledger::BatchSelection;
use crate::rollup::TabScope;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Batch to roll up; both fields must be set before a run
    #[serde(default)]
    pub selection: BatchSelection,

    /// Division manager position codes whose rows are kept.
    /// An empty list keeps every row.
    #[serde(default = "default_valid_positions")]
    pub valid_positions: Vec<String>,

    /// Top-down level ordering, ending with representatives
    #[serde(default)]
    pub levels: LevelOrder,

    #[serde(default)]
    pub tab_scope: TabScope,
}

fn default_valid_positions() -> Vec<String> {
    VALID_DIVISION_POSITIONS.iter().map(|p| p.to_string()).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection: BatchSelection::default(),
            valid_positions: default_valid_positions(),
            levels: LevelOrder::standard(),
            tab_scope: TabScope::Personal,
        }
    }
}

impl EngineConfig {
    pub fn from_json_path(path: &Path) -> EngineResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Check that a batch is selected
    pub fn validate(&self) -> EngineResult<()> {
        if self.selection.year.trim().is_empty() {
            return Err(EngineError::Config("no batch year selected".into()));
        }
        if self.selection.batch_label.trim().is_empty() {
            return Err(EngineError::Config("no batch label selected".into()));
        }
        Ok(())
    }
}
