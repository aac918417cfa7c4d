//! `co2-analysis` reconciles three country-level sources (a World Bank population export, a World
//! Bank GDP export and a tidy CO2 emissions table) into one long table and ranks countries by
//! per-capita emissions, per-capita GDP and change in per-capita emissions.
//!
//! The primary entrypoint is [`pipeline::run_pipeline`], which loads the files named by a
//! [`pipeline::PipelineConfig`] and runs every stage. Each stage is also callable on its own:
//!
//! 1. [`ingestion::parse_wide`]: irregularly quoted wide CSV → [`types::WideTable`]
//! 2. [`processing::melt`]: wide → long [`types::LongRecord`]s
//! 3. [`processing::merge`]: population × GDP × CO2 inner join → [`types::UnifiedRecord`]s
//! 4. [`processing::rank_by_co2_per_capita`], [`processing::rank_by_gdp_per_capita`],
//!    [`processing::rank_co2_change`]
//!
//! ## Errors and warnings
//!
//! Structural problems in the input (ragged rows, unparseable year headers, non-numeric cells)
//! abort with a [`PipelineError`]. Anything else degrades to a documented default and is reported
//! as an [`ingestion::PipelineWarning`], both through `tracing` and to the optional
//! [`ingestion::PipelineObserver`] in [`processing::AnalysisOptions`].
//!
//! ## Quick example
//!
//! ```rust
//! use co2_analysis::ingestion::parse_wide;
//! use co2_analysis::processing::{melt_years, merge, rank_by_co2_per_capita, AnalysisOptions};
//! use co2_analysis::types::Co2Record;
//!
//! # fn main() -> Result<(), co2_analysis::PipelineError> {
//! let population = parse_wide([
//!     "Country Name,\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"2001\",",
//!     "Mimuw,\"MIM\",\"Population, total\",\"SP.POP.TOTL\",\"100\",",
//! ])?;
//! let gdp = parse_wide([
//!     "Country Name,\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"2001\",",
//!     "Mimuw,\"MIM\",\"GDP (current US$)\",\"NY.GDP.MKTP.CD\",\"5000\",",
//! ])?;
//! let co2 = vec![Co2Record::new("MIMUW", 2001, Some(50.0), Some(0.5))];
//!
//! let options = AnalysisOptions::default();
//! let merged = merge(&melt_years(&population)?, &melt_years(&gdp)?, &co2, &options);
//! let ranking = rank_by_co2_per_capita(&merged.records, None, None, &options);
//! assert_eq!(ranking.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: source parsers, loaders and observability hooks
//! - [`types`]: wide/long/unified/ranking data model
//! - [`processing`]: reshaping, merging and ranking
//! - [`output`]: CSV export and Polars frames
//! - [`pipeline`]: configuration and the end-to-end runner
//! - [`error`]: the fatal error type

pub mod error;
pub mod ingestion;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
