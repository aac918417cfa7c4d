//! CO2 source ingestion (tidy `Country,Year,Total,Per Capita` CSV).

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::Co2Record;

/// Columns the CO2 source must provide; any others are ignored.
pub const CO2_COLUMNS: [&str; 4] = ["Country", "Year", "Total", "Per Capita"];

/// Read a CO2 CSV file into typed records.
///
/// Rules:
///
/// - CSV must have headers containing every column in [`CO2_COLUMNS`] (order can differ).
/// - Empty `Total` / `Per Capita` cells become `None`.
/// - `Year` must be an integer.
pub fn read_co2_from_path(path: impl AsRef<Path>) -> PipelineResult<Vec<Co2Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    read_co2_from_reader(&mut rdr)
}

/// Read CO2 records from an existing CSV reader.
pub fn read_co2_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> PipelineResult<Vec<Co2Record>> {
    let headers = rdr.headers()?.clone();
    for column in CO2_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::SchemaMismatch {
                message: format!(
                    "missing required column '{column}'. headers={:?}",
                    headers.iter().collect::<Vec<_>>()
                ),
            });
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize::<Co2Record>() {
        records.push(result?);
    }
    Ok(records)
}
