//! Header-keyed tables of loosely typed cells
//!
//! The ledger, the hierarchy and the contact directory all arrive as
//! spreadsheet exports. A `Table` keeps their cells as-is so that schema
//! validation can run up front and identifier cleanup can happen per column.

use crate::error::{EngineError, EngineResult};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One scalar from a source table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    /// Trimmed text form of the cell, `None` when empty or blank
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Int(value) => Some(value.to_string()),
            Cell::Float(value) if value.is_nan() => None,
            Cell::Float(value) => Some(value.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// A named table with one header row
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from in-memory rows
    ///
    /// Short rows are padded with empty cells so every row matches the header width.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Read a CSV export with a header row
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> EngineResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(Cell::from).collect());
        }

        Ok(Self::new(name, headers, rows))
    }

    /// Read a CSV export from disk, naming the table after the file
    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        Self::from_csv_reader(name, file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of an optional column
    pub fn find_column(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Position of a required column, or a schema error naming it
    pub fn require_column(&self, column: &str) -> EngineResult<usize> {
        self.find_column(column).ok_or_else(|| EngineError::Schema {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Validate that every listed column exists before any row is touched
    pub fn require_columns(&self, columns: &[&str]) -> EngineResult<Vec<usize>> {
        columns.iter().map(|c| self.require_column(c)).collect()
    }
}
