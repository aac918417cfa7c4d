//! CSV export.

use std::path::Path;

use serde::Serialize;

use crate::error::PipelineResult;

/// Write `rows` as CSV (header row first) to any writer.
///
/// Column names come from the rows' serde field names, e.g. `Year,Country,Value,Per Capita` for
/// [`crate::types::RankingRow`]. `None` values are written as empty cells.
pub fn write_csv<W, T>(writer: W, rows: &[T]) -> PipelineResult<()>
where
    W: std::io::Write,
    T: Serialize,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `rows` as CSV to a file, replacing it if it exists.
pub fn write_csv_to_path<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> PipelineResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(file, rows)
}
