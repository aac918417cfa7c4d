//! Loading all three sources in one call.
//!
//! Most callers should use [`load_sources`], which reads the population and GDP wide exports
//! and the CO2 table from disk and reports per-source row counts to the configured observer.

use std::fmt;
use std::path::PathBuf;

use crate::error::{PipelineError, PipelineResult};
use crate::processing::AnalysisOptions;
use crate::types::{Co2Record, WideTable};

use super::co2::read_co2_from_path;
use super::observability::{PipelineSeverity, PipelineStage, StageStats};
use super::wide::{read_wide_from_path, WideCsvOptions};

/// Paths of the three sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// Wide population export.
    pub population: PathBuf,
    /// Wide GDP export.
    pub gdp: PathBuf,
    /// Tidy CO2 table.
    pub co2: PathBuf,
}

/// The three sources after parsing, before reshaping.
#[derive(Clone, PartialEq)]
pub struct Sources {
    pub population: WideTable,
    pub gdp: WideTable,
    pub co2: Vec<Co2Record>,
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("population_rows", &self.population.row_count())
            .field("gdp_rows", &self.gdp.row_count())
            .field("co2_rows", &self.co2.len())
            .finish()
    }
}

/// Load and parse all three sources.
///
/// When an observer is configured, this function reports:
///
/// - `on_stage_complete` after each source, with its row count
/// - `on_failure` for the first failing source, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn load_sources(
    paths: &SourcePaths,
    wide_options: &WideCsvOptions,
    options: &AnalysisOptions,
) -> PipelineResult<Sources> {
    let population = observe(
        options,
        PipelineStage::ParseWide,
        read_wide_from_path(&paths.population, wide_options),
        WideTable::row_count,
    )?;
    let gdp = observe(
        options,
        PipelineStage::ParseWide,
        read_wide_from_path(&paths.gdp, wide_options),
        WideTable::row_count,
    )?;
    let co2 = observe(
        options,
        PipelineStage::LoadCo2,
        read_co2_from_path(&paths.co2),
        Vec::len,
    )?;

    Ok(Sources {
        population,
        gdp,
        co2,
    })
}

fn observe<T>(
    options: &AnalysisOptions,
    stage: PipelineStage,
    result: PipelineResult<T>,
    rows: impl Fn(&T) -> usize,
) -> PipelineResult<T> {
    match &result {
        Ok(value) => options.stage_complete(stage, StageStats { rows: rows(value) }),
        Err(e) => options.failure(stage, severity_for_error(e), e),
    }
    result
}

/// Map an error to the severity reported to observers.
pub fn severity_for_error(e: &PipelineError) -> PipelineSeverity {
    match e {
        PipelineError::Io(_) => PipelineSeverity::Critical,
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => PipelineSeverity::Critical,
            _ => PipelineSeverity::Error,
        },
        PipelineError::Json(_)
        | PipelineError::Polars(_)
        | PipelineError::Structural { .. }
        | PipelineError::InvalidYearHeader { .. }
        | PipelineError::SchemaMismatch { .. }
        | PipelineError::ParseError { .. } => PipelineSeverity::Error,
    }
}
