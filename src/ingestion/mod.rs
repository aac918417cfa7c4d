//! Source ingestion.
//!
//! - [`wide`]: the population/GDP wide exports (irregular quoting, embedded commas)
//! - [`co2`]: the tidy CO2 table
//! - [`unified`]: [`load_sources`], loading all three with observer reporting
//! - [`observability`]: warnings, severities and the [`PipelineObserver`] hooks

pub mod co2;
pub mod observability;
pub mod unified;
pub mod wide;

pub use co2::{read_co2_from_path, read_co2_from_reader};
pub use observability::{
    CompositeObserver, FileObserver, PipelineObserver, PipelineSeverity, PipelineStage, PipelineWarning,
    StageStats, TracingObserver,
};
pub use unified::{load_sources, severity_for_error, SourcePaths, Sources};
pub use wide::{parse_wide, read_wide_from_path, read_wide_from_reader, WideCsvOptions};
