//! Organizational hierarchy: levels, the filtered chain table and its lookups

mod index;
mod level;
mod node;

pub use index::{
    DropStats, HierarchyIndex, HierarchyRecord, NodeEntry, OrgRef, DIVISION_POSITION_COLUMN,
    VALID_DIVISION_POSITIONS,
};
pub use level::{Level, LevelOrder};
pub use node::{ManagerNode, Subtree, TeamSet};
