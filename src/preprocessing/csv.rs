//! CSV pre-processing for the taxi and flight benchmark datasets. Column
//! indices and scale factors match the public NYC taxi and on-time flight
//! performance dataset layouts these preprocessors target.

use std::io::Write;

use thiserror::Error;

use super::records::{FlightRecord, TaxiRecord};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("row {0} is missing expected column {1}")]
    MissingField(usize, &'static str),
    #[error("row {0} column {1} is not a number: {2:?}")]
    NotANumber(usize, &'static str, String),
}

fn field(record: &csv::StringRecord, idx: usize, row: usize, name: &'static str) -> Result<f64, PreprocessError> {
    let raw = record.get(idx).ok_or(PreprocessError::MissingField(row, name))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| PreprocessError::NotANumber(row, name, raw.to_string()))
}

/// Reads the NYC taxi CSV schema, scaling `trip_distance` (column 4),
/// `fare_amount` (column 10), and `total_amount` (column 16) by 100 and
/// truncating to `u64`, writing little-endian `TaxiRecord`s to `out`.
pub fn preprocess_taxi(
    reader: impl std::io::Read,
    out: &mut impl Write,
) -> Result<usize, PreprocessError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut written = 0;

    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let distance = field(&record, 4, row, "trip_distance")?;
        let fare = field(&record, 10, row, "fare_amount")?;
        let total = field(&record, 16, row, "total_amount")?;

        let record = TaxiRecord {
            distance: (distance * 100.0) as u64,
            fare: (fare * 100.0) as u64,
            total: (total * 100.0) as u64,
        };
        record.write_to(out)?;
        written += 1;
    }

    Ok(written)
}

/// Reads the flights CSV schema, taking `elapsed_time`/`air_time`/
/// `distance` (columns 15/16/17) and filtering out rows with
/// `air_time < 20`.
pub fn preprocess_flight(
    reader: impl std::io::Read,
    out: &mut impl Write,
) -> Result<usize, PreprocessError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut written = 0;

    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let elapsed_time = field(&record, 15, row, "elapsed_time")? as u64;
        let air_time = field(&record, 16, row, "air_time")? as u64;
        let distance = field(&record, 17, row, "distance")? as u64;

        let record = FlightRecord { elapsed_time, air_time, distance };
        if !record.passes_filter() {
            continue;
        }
        record.write_to(out)?;
        written += 1;
    }

    Ok(written)
}
