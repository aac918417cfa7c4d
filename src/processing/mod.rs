//! In-memory transformations: wide → long → unified → rankings.
//!
//! Every stage consumes the previous stage's output and never mutates its input:
//!
//! - [`reshape`]: [`melt()`] / [`melt_years()`] wide tables into [`crate::types::LongRecord`]s and
//!   [`pivot()`] them back
//! - [`merge`]: three-way inner join into [`crate::types::UnifiedRecord`]s
//! - [`ranking`]: per-year top-K rankings and windowed CO2 change rankings
//!
//! ## Example: merge → rank
//!
//! ```rust
//! use co2_analysis::processing::{merge, rank_by_co2_per_capita, AnalysisOptions};
//! use co2_analysis::types::{Co2Record, LongRecord};
//!
//! let population = vec![LongRecord::new("Mimuw", 2001, Some(100.0))];
//! let gdp = vec![LongRecord::new("MIMUW", 2001, Some(5000.0))];
//! let co2 = vec![Co2Record::new("mimuw", 2001, Some(50.0), Some(0.5))];
//!
//! let options = AnalysisOptions::default();
//! let merged = merge(&population, &gdp, &co2, &options);
//! assert_eq!(merged.records.len(), 1);
//! assert!(merged.excluded_countries.is_empty());
//!
//! let ranking = rank_by_co2_per_capita(&merged.records, None, None, &options);
//! assert_eq!(ranking[0].country, "MIMUW");
//! ```

pub mod merge;
pub mod ranking;
pub mod reshape;

use std::fmt;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::ingestion::observability::{
    PipelineObserver, PipelineSeverity, PipelineStage, PipelineWarning, StageStats,
};

pub use merge::{merge, Merged};
pub use ranking::{
    rank_by_co2_per_capita, rank_by_gdp_per_capita, rank_co2_change, rank_co2_per_capita_windows,
    with_gdp_per_capita, Co2Change,
};
pub use reshape::{melt, melt_years, pivot, Pivot};

/// Default number of countries kept per ranking.
pub const DEFAULT_TOP_K: usize = 5;

/// Default span of the CO2 change window, in years.
pub const DEFAULT_WINDOW_YEARS: i32 = 10;

/// Options shared by the merge and ranking stages.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct AnalysisOptions {
    /// Rows kept per year (rankings) or per list (change ranking).
    pub top_k: usize,
    /// Window used by [`rank_co2_change`] when the caller passes `None`.
    pub window_years: i32,
    /// Optional observer for warnings, stage stats and failures.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: PipelineSeverity,
}

impl fmt::Debug for AnalysisOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisOptions")
            .field("top_k", &self.top_k)
            .field("window_years", &self.window_years)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            window_years: DEFAULT_WINDOW_YEARS,
            observer: None,
            alert_at_or_above: PipelineSeverity::Critical,
        }
    }
}

impl AnalysisOptions {
    /// Attach an observer.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub(crate) fn warn(&self, warning: PipelineWarning) {
        tracing::warn!(severity = ?warning.severity(), "{warning}");
        if let Some(obs) = self.observer.as_ref() {
            obs.on_warning(&warning);
        }
    }

    pub(crate) fn stage_complete(&self, stage: PipelineStage, stats: StageStats) {
        tracing::debug!(?stage, rows = stats.rows, "stage complete");
        if let Some(obs) = self.observer.as_ref() {
            obs.on_stage_complete(stage, stats);
        }
    }

    pub(crate) fn failure(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        if let Some(obs) = self.observer.as_ref() {
            obs.on_failure(stage, severity, error);
            if severity >= self.alert_at_or_above {
                obs.on_alert(stage, severity, error);
            }
        }
    }
}
