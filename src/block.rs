//! Blocks of a decomposition

use crate::submodel::SubModel;

/// Where a block came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Pure rows of one oracle part
    Partition { part: usize },
    /// Rows listed under this label in a user block definition
    Explicit { label: i64 },
    /// Synthetic zero-row block carrying a single master-only column
    MasterOnly { column: usize },
}

/// One decomposition sub-problem
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Position in the block list; real blocks first, then master-only
    pub id: usize,
    pub kind: BlockKind,
    /// Original row ids, ascending
    pub rows: Vec<usize>,
    /// Original column ids referenced by `rows`, ascending
    pub active_columns: Vec<usize>,
    pub model: SubModel,
}

impl Block {
    pub fn is_master_only(&self) -> bool {
        matches!(self.kind, BlockKind::MasterOnly { .. })
    }
}
