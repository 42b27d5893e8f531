//! Pointer modes a correlation index can resolve into.
//!
//! A tuple reference is either a stable logical record id or a physical
//! row offset. Folding both into one small sum type instead of an untyped
//! integer means call sites can't mix the two by accident.

use super::row_store::RowOffset;

/// What a leaf of the index actually stores as its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleRef {
    /// A stable record id, independent of physical storage location.
    Logical(u64),
    /// A direct offset into a [`RowStore`](super::row_store::RowStore).
    Physical(RowOffset),
}

impl TupleRef {
    pub fn as_u64(self) -> u64 {
        match self {
            TupleRef::Logical(id) => id,
            TupleRef::Physical(offset) => offset.0,
        }
    }
}

/// Which [`TupleRef`] variant a given index instance is configured to use.
///
/// Set once at construction and shared by every node in the tree; it is
/// not per-tuple, unlike [`TupleRef`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    Logical,
    Physical,
}
