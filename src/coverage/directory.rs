//! Contact directory keyed by account identifier

use crate::error::EngineResult;
use crate::identity::normalize_id;
use crate::table::Table;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Directory export column names
pub mod columns {
    pub const ACCOUNT_ID: &str = "SU01 Acct #";
    pub const EMAIL: &str = "SU01 Email";
    pub const NAME: &str = "SU01 Name";
}

const UNKNOWN_NAME: &str = "Unknown";

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
}

impl Contact {
    /// The email, when it is usable for delivery
    pub fn deliverable_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| e.contains('@'))
    }
}

/// Identifier -> contact, first entry per identifier wins
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    entries: HashMap<String, Contact>,
    order: Vec<String>,
}

impl ContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a directory export; rows without an account id are skipped
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        let id_col = table.require_column(columns::ACCOUNT_ID)?;
        let email_col = table.require_column(columns::EMAIL)?;
        let name_col = table.find_column(columns::NAME);

        let mut directory = Self::new();
        let mut duplicates = 0usize;
        for row in table.rows() {
            let Some(id) = normalize_id(&row[id_col]) else {
                continue;
            };
            let contact = Contact {
                id,
                email: row[email_col].text().filter(|e| !is_null_token(e)),
                name: name_col
                    .and_then(|c| row[c].text())
                    .filter(|n| !is_null_token(n))
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            };
            if !directory.insert(contact) {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            debug!("{} duplicate directory ids ignored in '{}'", duplicates, table.name());
        }
        info!("Contact directory: {} rows, {} unique ids", table.len(), directory.len());
        Ok(directory)
    }

    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        Self::from_table(&Table::from_csv_path(path)?)
    }

    /// Add a contact unless its identifier is already present
    pub fn insert(&mut self, contact: Contact) -> bool {
        if self.entries.contains_key(&contact.id) {
            return false;
        }
        self.order.push(contact.id.clone());
        self.entries.insert(contact.id.clone(), contact);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contacts in insertion order
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Fold a newer export in; existing entries are kept. Returns the number of new ids.
    pub fn merge(&mut self, newer: ContactDirectory) -> usize {
        let before = self.len();
        let ContactDirectory { mut entries, order } = newer;
        for id in order {
            if let Some(contact) = entries.remove(&id) {
                self.insert(contact);
            }
        }
        let added = self.len() - before;
        info!("Directory sync added {} new ids ({} total)", added, self.len());
        added
    }
}

fn is_null_token(text: &str) -> bool {
    text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn directory_table(rows: Vec<Vec<Cell>>) -> Table {
        Table::new(
            "directory",
            vec![
                columns::ACCOUNT_ID.into(),
                columns::EMAIL.into(),
                columns::NAME.into(),
            ],
            rows,
        )
    }

    #[test]
    fn test_load_normalizes_and_keeps_first() {
        let table = directory_table(vec![
            vec![Cell::Float(101.0), "ann@example.com".into(), "Ann".into()],
            vec!["101".into(), "other@example.com".into(), "Ann 2".into()],
            vec![Cell::Empty, "x@example.com".into(), "No Id".into()],
            vec!["102".into(), "nan".into(), Cell::Empty],
        ]);
        let directory = ContactDirectory::from_table(&table).unwrap();

        assert_eq!(directory.len(), 2);
        let ann = directory.get("101").unwrap();
        assert_eq!(ann.email.as_deref(), Some("ann@example.com"));
        assert_eq!(ann.name, "Ann");

        let blank = directory.get("102").unwrap();
        assert_eq!(blank.email, None);
        assert_eq!(blank.name, "Unknown");
    }

    #[test]
    fn test_extra_export_columns_are_ignored() {
        let table = Table::new(
            "directory",
            vec![
                "HR Supervisor #".into(),
                columns::ACCOUNT_ID.into(),
                columns::EMAIL.into(),
                "HR 2nd Line Manager #".into(),
            ],
            vec![vec![Cell::Int(55), "7".into(), "gus@example.com".into(), Cell::Int(66)]],
        );
        let directory = ContactDirectory::from_table(&table).unwrap();

        assert_eq!(
            directory.get("7"),
            Some(&Contact {
                id: "7".into(),
                email: Some("gus@example.com".into()),
                name: "Unknown".into(),
            })
        );
        assert!(directory.get("55").is_none());
    }

    #[test]
    fn test_missing_email_column_is_schema_error() {
        let table = Table::new("directory", vec![columns::ACCOUNT_ID.into()], vec![]);
        assert!(ContactDirectory::from_table(&table).is_err());
    }

    #[test]
    fn test_merge_counts_new_ids() {
        let mut base = ContactDirectory::from_table(&directory_table(vec![vec![
            "1".into(),
            "old@example.com".into(),
            "One".into(),
        ]]))
        .unwrap();
        let newer = ContactDirectory::from_table(&directory_table(vec![
            vec!["1.0".into(), "new@example.com".into(), "One".into()],
            vec!["2".into(), "two@example.com".into(), "Two".into()],
        ]))
        .unwrap();

        assert_eq!(base.merge(newer), 1);
        assert_eq!(base.len(), 2);
        assert_eq!(base.get("1").unwrap().email.as_deref(), Some("old@example.com"));
        let ids: Vec<&str> = base.contacts().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_deliverable_email() {
        let contact = |email: Option<&str>| Contact {
            id: "1".into(),
            email: email.map(String::from),
            name: "One".into(),
        };
        assert_eq!(contact(Some("a@b.com")).deliverable_email(), Some("a@b.com"));
        assert_eq!(contact(Some("not-an-email")).deliverable_email(), None);
        assert_eq!(contact(None).deliverable_email(), None);
    }
}
