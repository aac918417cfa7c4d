//! End-to-end run: load → parse → melt → merge → rank.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PipelineResult;
use crate::ingestion::observability::{PipelineStage, StageStats};
use crate::ingestion::unified::{load_sources, SourcePaths, Sources};
use crate::ingestion::wide::WideCsvOptions;
use crate::processing::{
    melt_years, merge, rank_by_co2_per_capita, rank_by_gdp_per_capita, rank_co2_change,
    AnalysisOptions, Co2Change, DEFAULT_TOP_K, DEFAULT_WINDOW_YEARS,
};
use crate::types::{RankingRow, UnifiedRecord};

/// Serializable run configuration.
///
/// ```json
/// {
///   "population_path": "data/API_SP.POP.TOTL.csv",
///   "gdp_path": "data/API_NY.GDP.MKTP.CD.csv",
///   "co2_path": "data/fossil-fuel-co2-emissions-by-nation.csv",
///   "skip_lines": 4,
///   "start_year": 2000,
///   "end_year": 2014
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    pub population_path: PathBuf,
    pub gdp_path: PathBuf,
    pub co2_path: PathBuf,
    /// Leading metadata lines to drop from both wide sources.
    #[serde(default)]
    pub skip_lines: usize,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    /// End of the CO2 change window; defaults to the last year present.
    #[serde(default)]
    pub up_to_year: Option<i32>,
    #[serde(default = "default_window_years")]
    pub window_years: i32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_window_years() -> i32 {
    DEFAULT_WINDOW_YEARS
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl PipelineConfig {
    /// Config with the three paths and every other setting at its default.
    pub fn new(
        population_path: impl Into<PathBuf>,
        gdp_path: impl Into<PathBuf>,
        co2_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            population_path: population_path.into(),
            gdp_path: gdp_path.into(),
            co2_path: co2_path.into(),
            skip_lines: 0,
            start_year: None,
            end_year: None,
            up_to_year: None,
            window_years: DEFAULT_WINDOW_YEARS,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Parse a JSON config string.
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn source_paths(&self) -> SourcePaths {
        SourcePaths {
            population: self.population_path.clone(),
            gdp: self.gdp_path.clone(),
            co2: self.co2_path.clone(),
        }
    }
}

/// Everything one run produces.
#[derive(Clone, PartialEq)]
pub struct PipelineReport {
    pub unified: Vec<UnifiedRecord>,
    pub excluded_countries: BTreeSet<String>,
    pub co2_ranking: Vec<RankingRow>,
    pub gdp_ranking: Vec<RankingRow>,
    pub co2_change: Co2Change,
}

impl fmt::Debug for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineReport")
            .field("unified_rows", &self.unified.len())
            .field("excluded_countries", &self.excluded_countries.len())
            .field("co2_ranking_rows", &self.co2_ranking.len())
            .field("gdp_ranking_rows", &self.gdp_ranking.len())
            .field("top_reducers", &self.co2_change.top_reducers.len())
            .field("top_increasers", &self.co2_change.top_increasers.len())
            .finish()
    }
}

/// Load the configured sources from disk and run every stage.
///
/// `config.top_k` and `config.window_years` override the corresponding fields of `options`;
/// the observer and alert threshold are taken from `options`.
pub fn run_pipeline(config: &PipelineConfig, options: &AnalysisOptions) -> PipelineResult<PipelineReport> {
    let options = AnalysisOptions {
        top_k: config.top_k,
        window_years: config.window_years,
        ..options.clone()
    };
    let wide_options = WideCsvOptions {
        skip_lines: config.skip_lines,
    };
    let sources = load_sources(&config.source_paths(), &wide_options, &options)?;
    analyze(&sources, config.start_year, config.end_year, config.up_to_year, &options)
}

/// Run every stage after loading on already-parsed sources.
pub fn analyze(
    sources: &Sources,
    start_year: Option<i32>,
    end_year: Option<i32>,
    up_to_year: Option<i32>,
    options: &AnalysisOptions,
) -> PipelineResult<PipelineReport> {
    let population = melt_years(&sources.population)?;
    let gdp = melt_years(&sources.gdp)?;
    options.stage_complete(
        PipelineStage::Melt,
        StageStats {
            rows: population.len() + gdp.len(),
        },
    );

    let merged = merge(&population, &gdp, &sources.co2, options);
    let co2_ranking = rank_by_co2_per_capita(&merged.records, start_year, end_year, options);
    let gdp_ranking = rank_by_gdp_per_capita(&merged.records, start_year, end_year, options);
    let co2_change = rank_co2_change(&merged.records, up_to_year, None, options);

    Ok(PipelineReport {
        unified: merged.records,
        excluded_countries: merged.excluded_countries,
        co2_ranking,
        gdp_ranking,
        co2_change,
    })
}
