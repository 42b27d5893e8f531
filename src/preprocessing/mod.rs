//! CSV-to-binary pre-processing for the taxi and flight benchmark data
//! sources, and the fixed-width record formats they produce.

pub mod csv;
pub mod micro;
pub mod records;

pub use records::{FlightRecord, TaxiRecord};
