//! Polars interop for callers that keep working in data frames.

use polars::prelude::*;

use crate::error::PipelineResult;
use crate::types::{RankingRow, ReductionRow, UnifiedRecord};

/// Columns: `Country, Year, Population, GDP, Total, Per Capita`.
pub fn unified_frame(records: &[UnifiedRecord]) -> PipelineResult<DataFrame> {
    Ok(df!(
        "Country" => records.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        "Year" => records.iter().map(|r| r.year).collect::<Vec<_>>(),
        "Population" => records.iter().map(|r| r.population).collect::<Vec<_>>(),
        "GDP" => records.iter().map(|r| r.gdp).collect::<Vec<_>>(),
        "Total" => records.iter().map(|r| r.total_co2).collect::<Vec<_>>(),
        "Per Capita" => records.iter().map(|r| r.co2_per_capita).collect::<Vec<_>>(),
    )?)
}

/// Columns: `Year, Country, <value_name>, <per_capita_name>`.
///
/// The caller names the metric columns, e.g. `Total`/`Per Capita` for CO2 or
/// `GDP`/`GDP Per Capita` for GDP.
pub fn ranking_frame(
    rows: &[RankingRow],
    value_name: &str,
    per_capita_name: &str,
) -> PipelineResult<DataFrame> {
    Ok(df!(
        "Year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        "Country" => rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        value_name => rows.iter().map(|r| r.value).collect::<Vec<_>>(),
        per_capita_name => rows.iter().map(|r| r.per_capita).collect::<Vec<_>>(),
    )?)
}

/// Columns: `Country, Delta`.
pub fn reduction_frame(rows: &[ReductionRow]) -> PipelineResult<DataFrame> {
    Ok(df!(
        "Country" => rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        "Delta" => rows.iter().map(|r| r.delta).collect::<Vec<_>>(),
    )?)
}
