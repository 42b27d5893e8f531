//! Orchestrates bulk construction of a Correlation Index from a row store.

pub mod driver;

pub use driver::{build_correlation_index, BuildError, InputError};
