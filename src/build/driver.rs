//! Builder driver: turns a row store into a constructed correlation index.
//!
//! Walks the base table once to materialize a triples buffer before
//! handing it to the recursive builder. Materialization is a standalone
//! function so the transient triples buffer's lifetime is scoped to this
//! call: it's a local, dropped on every return path including the early
//! `?` ones, with no manual guard needed.

use thiserror::Error;

use crate::core::{BuildError as ConstructError, CIConfig, CorrelationIndex};
use crate::store::{AttrId, PointerMode, RowStore, TupleSchema};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("attribute {0:?} not present in schema ({1} attributes defined)")]
    MissingColumn(AttrId, usize),
    #[error("guest column is {0} bytes wide, host column is {1}: a correlation index needs matching widths")]
    ColumnWidthMismatch(usize, usize),
    #[error("pointer_mode is Logical but no primary-key column was supplied")]
    MissingPrimaryKeyColumn,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] crate::core::ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
}

impl From<ConstructError> for BuildError {
    fn from(err: ConstructError) -> Self {
        match err {
            ConstructError::Config(e) => BuildError::Config(e),
        }
    }
}

/// Materializes (guest, host, tuple_ref) triples from `row_store` and
/// constructs a [`CorrelationIndex`] over them.
///
/// `primary_key_col` is required when `pointer_mode` is
/// [`PointerMode::Logical`] (the tuple ref is the primary key value) and
/// ignored under [`PointerMode::Physical`] (the tuple ref is the row
/// offset `RowStore::iter` already provides).
#[allow(clippy::too_many_arguments)]
pub fn build_correlation_index(
    row_store: &RowStore,
    schema: &TupleSchema,
    primary_key_col: Option<AttrId>,
    guest_col: AttrId,
    host_col: AttrId,
    pointer_mode: PointerMode,
    config: &CIConfig,
) -> Result<CorrelationIndex, BuildError> {
    config.validate()?;
    validate_columns(schema, primary_key_col, guest_col, host_col, pointer_mode)?;

    let mut triples = Vec::with_capacity(row_store.len());
    for (offset, tuple) in row_store.iter() {
        let guest = schema.read_u64(tuple, guest_col);
        let host = schema.read_u64(tuple, host_col);
        let tuple_ref = match pointer_mode {
            PointerMode::Physical => offset.0,
            PointerMode::Logical => {
                let pk_col = primary_key_col.expect("checked by validate_columns");
                schema.read_u64(tuple, pk_col)
            }
        };
        triples.push(crate::core::Triple::new(guest, host, tuple_ref));
    }

    log::debug!("materialized {} training triples from row store", triples.len());

    let index = CorrelationIndex::construct(triples, config, pointer_mode)?;
    Ok(index)
}

fn validate_columns(
    schema: &TupleSchema,
    primary_key_col: Option<AttrId>,
    guest_col: AttrId,
    host_col: AttrId,
    pointer_mode: PointerMode,
) -> Result<(), InputError> {
    let attr_count = schema.attr_count();
    for &col in &[guest_col, host_col] {
        if col.0 >= attr_count {
            return Err(InputError::MissingColumn(col, attr_count));
        }
    }

    match pointer_mode {
        PointerMode::Logical => match primary_key_col {
            None => return Err(InputError::MissingPrimaryKeyColumn),
            Some(col) if col.0 >= attr_count => {
                return Err(InputError::MissingColumn(col, attr_count));
            }
            Some(_) => {}
        },
        PointerMode::Physical => {}
    }

    let guest_width = schema.attr_width(guest_col);
    let host_width = schema.attr_width(host_col);
    if guest_width != host_width {
        return Err(InputError::ColumnWidthMismatch(guest_width, host_width));
    }

    Ok(())
}
