//! Row storage and classical (non-learned) ordered indices: the external
//! collaborators a correlation index sits alongside rather than replaces.

pub mod host_index;
pub mod ordered_map;
pub mod primary_index;
pub mod row_store;
pub mod schema;
pub mod tuple_ref;

pub use host_index::HostIndex;
pub use ordered_map::OrderedMultiMap;
pub use primary_index::PrimaryIndex;
pub use row_store::{RowOffset, RowStore};
pub use schema::{AttrId, TupleSchema};
pub use tuple_ref::{PointerMode, TupleRef};
