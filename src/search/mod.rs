//! Query execution: wires the Correlation Index together with the classical
//! collaborators to answer guest-column predicates.

pub mod executor;

pub use executor::QueryExecutor;
