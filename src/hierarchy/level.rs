//! Organizational levels and their ordering
//!
//! `LevelOrder` is the single source of truth for which levels exist and how
//! they nest. Sub-level tabs, intervening hierarchy columns and master report
//! chains are all derived from it rather than from per-level branches.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One rung of the chain of command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    VicePresident,
    Director,
    AreaManager,
    FieldSalesManager,
    Representative,
}

impl Level {
    /// Short code used in report metadata and file names
    pub fn code(self) -> &'static str {
        match self {
            Level::VicePresident => "VP",
            Level::Director => "DIRECTOR",
            Level::AreaManager => "AM",
            Level::FieldSalesManager => "FSM",
            Level::Representative => "REP",
        }
    }

    /// Human readable title
    pub fn title(self) -> &'static str {
        match self {
            Level::VicePresident => "Vice President",
            Level::Director => "Division Manager",
            Level::AreaManager => "Area Manager",
            Level::FieldSalesManager => "Field Sales Manager",
            Level::Representative => "Sales Representative",
        }
    }

    /// Header of the hierarchy column that shows this level's display name
    pub fn column_label(self) -> &'static str {
        match self {
            Level::VicePresident => "VP",
            Level::Director => "Director",
            Level::AreaManager => "Area Manager",
            Level::FieldSalesManager => "FSM",
            Level::Representative => "Rep",
        }
    }

    /// Prefix of the summary/detail tab titles
    pub fn tab_label(self) -> &'static str {
        match self {
            Level::VicePresident => "VP",
            Level::Director => "Director",
            Level::AreaManager => "Area Mgr",
            Level::FieldSalesManager => "FSM",
            Level::Representative => "Rep",
        }
    }

    /// Identifier column in the hierarchy table
    pub fn id_column(self) -> &'static str {
        match self {
            Level::VicePresident => "Vice President ID",
            Level::Director => "Division Manager ID",
            Level::AreaManager => "Area Manager ID",
            Level::FieldSalesManager => "Field Sales Manager ID",
            Level::Representative => "Sales Person ID",
        }
    }

    /// Display name column in the hierarchy table
    pub fn name_column(self) -> &'static str {
        match self {
            Level::VicePresident => "Vice President Name",
            Level::Director => "Division Manager Name",
            Level::AreaManager => "Area Manager Name",
            Level::FieldSalesManager => "Field Sales Manager Name",
            Level::Representative => "Sales Person Name",
        }
    }

    pub fn from_code(code: &str) -> Option<Level> {
        match code.trim().to_ascii_uppercase().as_str() {
            "VP" => Some(Level::VicePresident),
            "DIRECTOR" | "DM" => Some(Level::Director),
            "AM" => Some(Level::AreaManager),
            "FSM" => Some(Level::FieldSalesManager),
            "REP" => Some(Level::Representative),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered list of levels, top of the chain first, representatives last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Level>", into = "Vec<Level>")]
pub struct LevelOrder {
    levels: Vec<Level>,
}

impl LevelOrder {
    /// Validate an ordering
    ///
    /// The list must hold at least one manager level, end with
    /// `Representative`, and run strictly top-down.
    pub fn new(levels: Vec<Level>) -> EngineResult<Self> {
        if levels.last() != Some(&Level::Representative) {
            return Err(EngineError::Config(
                "level order must end with the representative level".into(),
            ));
        }
        if levels.len() < 2 {
            return Err(EngineError::Config(
                "level order needs at least one manager level".into(),
            ));
        }
        for pair in levels.windows(2) {
            if pair[0] >= pair[1] {
                return Err(EngineError::Config(format!(
                    "level {} cannot sit above {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { levels })
    }

    /// VP > Director > Area Manager > FSM > Representative
    pub fn standard() -> Self {
        Self {
            levels: vec![
                Level::VicePresident,
                Level::Director,
                Level::AreaManager,
                Level::FieldSalesManager,
                Level::Representative,
            ],
        }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn index_of(&self, level: Level) -> Option<usize> {
        self.levels.iter().position(|l| *l == level)
    }

    pub fn contains(&self, level: Level) -> bool {
        self.index_of(level).is_some()
    }

    /// Every level that can own a rollup report
    pub fn manager_levels(&self) -> &[Level] {
        &self.levels[..self.levels.len() - 1]
    }

    /// Levels that get a tab in some report: everything below the top
    pub fn reportable_levels(&self) -> &[Level] {
        &self.levels[1..]
    }

    /// The first-line manager level, directly above representatives
    pub fn first_line(&self) -> Level {
        self.levels[self.levels.len() - 2]
    }

    /// Levels strictly below `level`, top-down
    pub fn below(&self, level: Level) -> &[Level] {
        match self.index_of(level) {
            Some(i) => &self.levels[i + 1..],
            None => &[],
        }
    }

    /// Levels strictly above `level`, top-down
    pub fn above(&self, level: Level) -> &[Level] {
        match self.index_of(level) {
            Some(i) => &self.levels[..i],
            None => &[],
        }
    }

    /// Levels strictly between `upper` and `lower`, top-down
    pub fn between(&self, upper: Level, lower: Level) -> &[Level] {
        match (self.index_of(upper), self.index_of(lower)) {
            (Some(u), Some(l)) if u < l => &self.levels[u + 1..l],
            _ => &[],
        }
    }
}

impl Default for LevelOrder {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Level>> for LevelOrder {
    type Error = EngineError;

    fn try_from(levels: Vec<Level>) -> EngineResult<Self> {
        Self::new(levels)
    }
}

impl From<LevelOrder> for Vec<Level> {
    fn from(order: LevelOrder) -> Self {
        order.levels
    }
}
