//! Rollup targets and the slice of hierarchy beneath them

use super::index::HierarchyRecord;
use super::level::Level;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// One manager that may receive a rollup report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManagerNode {
    pub level: Level,
    pub id: String,
    pub name: String,
}

impl ManagerNode {
    pub fn new(level: Level, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Representative identifiers whose chain passes through one node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSet {
    ids: BTreeSet<String>,
}

impl TeamSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|s| s.as_str())
    }

    /// True when at least one member earned something in the batch
    pub fn intersects(&self, batch_reps: &HashSet<&str>) -> bool {
        self.ids.iter().any(|id| batch_reps.contains(id.as_str()))
    }
}

impl FromIterator<String> for TeamSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Hierarchy rows under one node, or the whole hierarchy
#[derive(Debug, Clone)]
pub struct Subtree<'a> {
    rows: Vec<&'a HierarchyRecord>,
}

impl<'a> Subtree<'a> {
    pub fn new(rows: Vec<&'a HierarchyRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a HierarchyRecord] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn team(&self) -> TeamSet {
        self.rows
            .iter()
            .filter_map(|r| r.representative.as_ref())
            .map(|r| r.id.clone())
            .collect()
    }

    /// Distinct identifiers at `level`, first-seen order
    pub fn members_at(&self, level: Level) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for &row in &self.rows {
            if let Some(person) = row.at(level) {
                if seen.insert(person.id.as_str()) {
                    members.push(person.id.as_str());
                }
            }
        }
        members
    }
}
