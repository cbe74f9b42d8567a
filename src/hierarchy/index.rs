//! Hierarchy loading, filtering and level-keyed lookups

use super::level::{Level, LevelOrder};
use super::node::{ManagerNode, Subtree};
use crate::error::EngineResult;
use crate::identity::{id_issue, is_unassigned, normalize_id};
use crate::table::Table;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Default allow-list of division manager position codes
pub const VALID_DIVISION_POSITIONS: [&str; 7] = [
    "40064102", "40064095", "40064096", "40064098", "40064471", "40064097", "40070873",
];

/// Column holding the division manager position code
pub const DIVISION_POSITION_COLUMN: &str = "Division Manager Position ID";

/// A person at some level of the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgRef {
    pub id: String,
    pub name: String,
}

/// One row of the organizational chain, after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyRecord {
    /// `None` for a vacant territory; the row still counts for its managers
    pub representative: Option<OrgRef>,
    pub field_sales_manager: Option<OrgRef>,
    pub area_manager: Option<OrgRef>,
    pub director: Option<OrgRef>,
    pub vice_president: Option<OrgRef>,
    pub division_position: Option<String>,
}

impl HierarchyRecord {
    /// The person this row names at `level`
    pub fn at(&self, level: Level) -> Option<&OrgRef> {
        match level {
            Level::VicePresident => self.vice_president.as_ref(),
            Level::Director => self.director.as_ref(),
            Level::AreaManager => self.area_manager.as_ref(),
            Level::FieldSalesManager => self.field_sales_manager.as_ref(),
            Level::Representative => self.representative.as_ref(),
        }
    }

    /// Display name at `level`, empty when the position is vacant
    pub fn name_at(&self, level: Level) -> &str {
        self.at(level).map(|r| r.name.as_str()).unwrap_or("")
    }

    fn slot_mut(&mut self, level: Level) -> Option<&mut Option<OrgRef>> {
        match level {
            Level::VicePresident => Some(&mut self.vice_president),
            Level::Director => Some(&mut self.director),
            Level::AreaManager => Some(&mut self.area_manager),
            Level::FieldSalesManager => Some(&mut self.field_sales_manager),
            Level::Representative => None,
        }
    }
}

/// Rows discarded while building the index, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropStats {
    /// Division position not in the allow-list
    pub invalid_position: usize,
    /// No first-line manager assigned
    pub unassigned_first_line: usize,
    /// An identifier that cannot be joined on (fractional or non-finite number)
    pub integrity: usize,
}

impl DropStats {
    pub fn total(&self) -> usize {
        self.invalid_position + self.unassigned_first_line + self.integrity
    }
}

/// Where an identifier appears at one level
#[derive(Debug, Clone)]
pub struct NodeEntry {
    /// First display name seen for the identifier
    pub name: String,
    /// Every retained row naming the identifier at this level, in source order
    pub rows: Vec<usize>,
}

impl NodeEntry {
    pub fn first_row(&self) -> usize {
        self.rows[0]
    }
}

/// Filtered hierarchy plus per-level lookups
#[derive(Debug, Clone)]
pub struct HierarchyIndex {
    order: LevelOrder,
    records: Vec<HierarchyRecord>,
    lookups: BTreeMap<Level, HashMap<String, NodeEntry>>,
    /// Identifiers per level in first-seen order
    seen: BTreeMap<Level, Vec<String>>,
    dropped: DropStats,
}

impl HierarchyIndex {
    /// Build the index from a raw hierarchy table
    ///
    /// All required columns are checked before any row is read. An empty
    /// `valid_positions` list disables the position filter.
    pub fn build(
        table: &Table,
        valid_positions: &[String],
        order: &LevelOrder,
    ) -> EngineResult<Self> {
        let rep_col = table.require_column(Level::Representative.id_column())?;
        let rep_name_col = table.find_column(Level::Representative.name_column());

        let mut manager_cols = Vec::new();
        for &level in order.manager_levels() {
            let id_col = table.require_column(level.id_column())?;
            let name_col = table.require_column(level.name_column())?;
            manager_cols.push((level, id_col, name_col));
        }

        let allowed: HashSet<String> = valid_positions
            .iter()
            .filter_map(|p| normalize_id(p.as_str()))
            .collect();
        let position_col = if allowed.is_empty() {
            table.find_column(DIVISION_POSITION_COLUMN)
        } else {
            Some(table.require_column(DIVISION_POSITION_COLUMN)?)
        };

        let first_line = order.first_line();
        let mut dropped = DropStats::default();
        let mut vacant = 0usize;
        let mut records = Vec::with_capacity(table.len());

        for (row_no, row) in table.rows().iter().enumerate() {
            let division_position = position_col.and_then(|c| normalize_id(&row[c]));
            if !allowed.is_empty()
                && !division_position
                    .as_ref()
                    .is_some_and(|p| allowed.contains(p))
            {
                dropped.invalid_position += 1;
                continue;
            }

            let rep_id = normalize_id(&row[rep_col]);
            if let Some((id, issue)) = rep_id.as_deref().and_then(|id| id_issue(id).map(|issue| (id, issue))) {
                warn!("hierarchy row {}: representative id '{}' unusable ({:?})", row_no + 2, id, issue);
                dropped.integrity += 1;
                continue;
            }

            let mut record = HierarchyRecord {
                representative: rep_id.map(|id| OrgRef {
                    id,
                    name: rep_name_col.and_then(|c| row[c].text()).unwrap_or_default(),
                }),
                field_sales_manager: None,
                area_manager: None,
                director: None,
                vice_president: None,
                division_position,
            };

            let mut unusable = false;
            for &(level, id_col, name_col) in &manager_cols {
                let id = match normalize_id(&row[id_col]) {
                    Some(id) if !is_unassigned(&id) => id,
                    _ => continue,
                };
                if let Some(issue) = id_issue(&id) {
                    warn!("hierarchy row {}: {} id '{}' unusable ({:?})", row_no + 2, level, id, issue);
                    unusable = true;
                    break;
                }
                let name = row[name_col].text().unwrap_or_default();
                if let Some(slot) = record.slot_mut(level) {
                    *slot = Some(OrgRef { id, name });
                }
            }
            if unusable {
                dropped.integrity += 1;
                continue;
            }

            if record.at(first_line).is_none() {
                dropped.unassigned_first_line += 1;
                continue;
            }

            if record.representative.is_none() {
                vacant += 1;
            }
            records.push(record);
        }

        if dropped.total() > 0 {
            warn!(
                "Dropped {} hierarchy rows ({} invalid position, {} without {}, {} unusable ids)",
                dropped.total(),
                dropped.invalid_position,
                dropped.unassigned_first_line,
                first_line,
                dropped.integrity
            );
        }
        if vacant > 0 {
            debug!("{vacant} hierarchy rows have no representative");
        }
        info!("Hierarchy index built from {} of {} rows", records.len(), table.len());

        Ok(Self::from_records(records, order.clone(), dropped))
    }

    /// Index already-normalized records
    pub fn from_records(records: Vec<HierarchyRecord>, order: LevelOrder, dropped: DropStats) -> Self {
        let mut lookups: BTreeMap<Level, HashMap<String, NodeEntry>> = BTreeMap::new();
        let mut seen: BTreeMap<Level, Vec<String>> = BTreeMap::new();

        for (row, record) in records.iter().enumerate() {
            for &level in order.levels() {
                let Some(person) = record.at(level) else {
                    continue;
                };
                let entries = lookups.entry(level).or_default();
                match entries.get_mut(&person.id) {
                    Some(entry) => {
                        entry.rows.push(row);
                        if entry.name.is_empty() && !person.name.is_empty() {
                            entry.name = person.name.clone();
                        }
                    }
                    None => {
                        entries.insert(
                            person.id.clone(),
                            NodeEntry {
                                name: person.name.clone(),
                                rows: vec![row],
                            },
                        );
                        seen.entry(level).or_default().push(person.id.clone());
                    }
                }
            }
        }

        for (level, ids) in &seen {
            debug!("{} distinct {} identifiers", ids.len(), level);
        }

        Self {
            order,
            records,
            lookups,
            seen,
            dropped,
        }
    }

    pub fn order(&self) -> &LevelOrder {
        &self.order
    }

    pub fn records(&self) -> &[HierarchyRecord] {
        &self.records
    }

    pub fn dropped(&self) -> DropStats {
        self.dropped
    }

    pub fn entry(&self, level: Level, id: &str) -> Option<&NodeEntry> {
        self.lookups.get(&level).and_then(|entries| entries.get(id))
    }

    pub fn display_name(&self, level: Level, id: &str) -> Option<&str> {
        self.entry(level, id).map(|e| e.name.as_str())
    }

    /// First hierarchy row naming `id` at `level`
    pub fn record_for(&self, level: Level, id: &str) -> Option<&HierarchyRecord> {
        self.entry(level, id).map(|e| &self.records[e.first_row()])
    }

    /// Identifiers at `level`, first-seen order
    pub fn ids_at(&self, level: Level) -> &[String] {
        self.seen.get(&level).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Representative identifiers present anywhere in the hierarchy
    pub fn representative_ids(&self) -> HashSet<&str> {
        self.records
            .iter()
            .filter_map(|r| r.representative.as_ref())
            .map(|r| r.id.as_str())
            .collect()
    }

    /// Every rollup target, ordered by level then identifier
    pub fn manager_nodes(&self) -> Vec<ManagerNode> {
        let mut nodes = Vec::new();
        for &level in self.order.manager_levels() {
            let mut ids: Vec<&String> = self.ids_at(level).iter().collect();
            ids.sort();
            for id in ids {
                let name = self.display_name(level, id).unwrap_or_default();
                nodes.push(ManagerNode::new(level, id.clone(), name));
            }
        }
        nodes
    }

    /// Rows under a manager node
    pub fn subtree(&self, node: &ManagerNode) -> Subtree<'_> {
        let rows = self
            .entry(node.level, &node.id)
            .map(|e| e.rows.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default();
        Subtree::new(rows)
    }

    /// The whole retained hierarchy
    pub fn whole(&self) -> Subtree<'_> {
        Subtree::new(self.records.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use crate::test_support::{hierarchy_table, sample_hierarchy_rows, standard_positions};

    #[test]
    fn test_builds_lookups() {
        let table = hierarchy_table(sample_hierarchy_rows());
        let index = HierarchyIndex::build(&table, &standard_positions(), &LevelOrder::standard()).unwrap();

        assert_eq!(index.records().len(), 3);
        assert_eq!(index.display_name(Level::FieldSalesManager, "F1"), Some("Fran One"));
        assert_eq!(index.ids_at(Level::FieldSalesManager), &["F1".to_string(), "F2".to_string()]);
        assert_eq!(index.entry(Level::AreaManager, "A1").unwrap().rows, vec![0, 1, 2]);

        let chain = index.record_for(Level::FieldSalesManager, "F2").unwrap();
        assert_eq!(chain.name_at(Level::AreaManager), "Alex Area");
        assert_eq!(chain.name_at(Level::VicePresident), "Val Vice");
    }

    #[test]
    fn test_filters_positions_and_unassigned() {
        let mut rows = sample_hierarchy_rows();
        // Legacy position code
        rows.push(vec!["R4", "F1", "Fran One", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "99999999"]);
        // No first-line manager
        rows.push(vec!["R5", "", "", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064102"]);
        rows.push(vec!["R6", "UNASSIGNED", "", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064102"]);
        // Fractional manager id
        rows.push(vec!["R7", "12.5", "Bad", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064102"]);

        let table = hierarchy_table(rows);
        let index = HierarchyIndex::build(&table, &standard_positions(), &LevelOrder::standard()).unwrap();

        assert_eq!(index.records().len(), 3);
        let dropped = index.dropped();
        assert_eq!(dropped.invalid_position, 1);
        assert_eq!(dropped.unassigned_first_line, 2);
        assert_eq!(dropped.integrity, 1);
        assert_eq!(dropped.total(), 4);
        assert!(!index.representative_ids().contains("R5"));
    }

    #[test]
    fn test_vacant_territory_rows_are_kept() {
        let mut rows = sample_hierarchy_rows();
        rows.push(vec!["", "F9", "Fay Nine", "A1", "Alex Area", "D1", "Dana Dir", "V1", "Val Vice", "40064102"]);

        let table = hierarchy_table(rows);
        let index = HierarchyIndex::build(&table, &standard_positions(), &LevelOrder::standard()).unwrap();

        assert_eq!(index.records().len(), 4);
        assert_eq!(index.dropped().total(), 0);
        assert_eq!(index.records()[3].representative, None);
        assert_eq!(index.display_name(Level::FieldSalesManager, "F9"), Some("Fay Nine"));
        assert_eq!(index.entry(Level::AreaManager, "A1").unwrap().rows, vec![0, 1, 2, 3]);
        assert_eq!(index.representative_ids().len(), 3);
        assert_eq!(index.ids_at(Level::Representative).len(), 3);
    }

    #[test]
    fn test_numeric_cells_normalize_before_join() {
        let headers = crate::test_support::hierarchy_headers();
        let row: Vec<Cell> = vec![
            Cell::Float(1001.0),
            Cell::Text("55.0".into()),
            "Fran".into(),
            Cell::Int(66),
            "Alex".into(),
            "77".into(),
            "Dana".into(),
            "88".into(),
            "Val".into(),
            Cell::Float(40064095.0),
        ];
        let table = Table::new("hierarchy", headers, vec![row]);
        let index = HierarchyIndex::build(&table, &standard_positions(), &LevelOrder::standard()).unwrap();

        assert_eq!(index.records().len(), 1);
        assert!(index.entry(Level::FieldSalesManager, "55").is_some());
        assert!(index.representative_ids().contains("1001"));
    }

    #[test]
    fn test_missing_column_fails_before_processing() {
        let table = Table::new(
            "hierarchy",
            vec!["Sales Person ID".into(), "Field Sales Manager ID".into()],
            vec![vec!["R1".into(), "F1".into()]],
        );
        let err = HierarchyIndex::build(&table, &standard_positions(), &LevelOrder::standard());
        assert!(matches!(err, Err(crate::error::EngineError::Schema { .. })));
    }

    #[test]
    fn test_manager_nodes_sorted_by_level_then_id() {
        let table = hierarchy_table(sample_hierarchy_rows());
        let index = HierarchyIndex::build(&table, &standard_positions(), &LevelOrder::standard()).unwrap();
        let nodes: Vec<(Level, String)> = index
            .manager_nodes()
            .into_iter()
            .map(|n| (n.level, n.id))
            .collect();

        assert_eq!(
            nodes,
            vec![
                (Level::VicePresident, "V1".to_string()),
                (Level::Director, "D1".to_string()),
                (Level::AreaManager, "A1".to_string()),
                (Level::FieldSalesManager, "F1".to_string()),
                (Level::FieldSalesManager, "F2".to_string()),
            ]
        );
    }
}
