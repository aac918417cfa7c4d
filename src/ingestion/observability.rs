//! Pipeline warnings, severities and observer hooks (composite, tracing and file-backed).

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PipelineError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Parsing a wide population/GDP source.
    ParseWide,
    /// Loading the tidy CO2 source.
    LoadCo2,
    /// Wide-to-long reshaping.
    Melt,
    /// Three-way join.
    Merge,
    /// Per-capita CO2 ranking.
    RankCo2PerCapita,
    /// Per-capita GDP ranking.
    RankGdpPerCapita,
    /// Windowed CO2 change ranking.
    RankCo2Change,
}

/// Minimal stats reported when a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    /// Number of rows the stage produced.
    pub rows: usize,
}

/// Non-fatal anomalies. Each one is paired with a documented fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    /// A ranking was asked for `start > end`; the full year range was used instead.
    InvalidYearRange { start: i32, end: i32 },
    /// A change-ranking endpoint year is not in the data; the full year span was used instead.
    MissingWindowYear { up_to_year: i32, window_start: i32 },
    /// Countries present in some sources but not all; they are absent from the joined table.
    ExcludedCountries { countries: Vec<String> },
}

impl PipelineWarning {
    pub fn severity(&self) -> PipelineSeverity {
        match self {
            PipelineWarning::ExcludedCountries { .. } => PipelineSeverity::Info,
            _ => PipelineSeverity::Warning,
        }
    }
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::InvalidYearRange { start, end } => write!(
                f,
                "start year {start} is after end year {end}; ranking the full year range instead"
            ),
            PipelineWarning::MissingWindowYear {
                up_to_year,
                window_start,
            } => write!(
                f,
                "years {window_start} and {up_to_year} are not both present; using the full year span instead"
            ),
            PipelineWarning::ExcludedCountries { countries } => write!(
                f,
                "{} countries are missing from at least one source and were excluded: {}",
                countries.len(),
                countries.join(", ")
            ),
        }
    }
}

/// Observer interface for pipeline outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, _stage: PipelineStage, _stats: StageStats) {}

    /// Called for every recoverable anomaly.
    fn on_warning(&self, _warning: &PipelineWarning) {}

    /// Called when a stage fails.
    fn on_failure(&self, _stage: PipelineStage, _severity: PipelineSeverity, _error: &PipelineError) {}

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        self.on_failure(stage, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage_complete(&self, stage: PipelineStage, stats: StageStats) {
        for o in &self.observers {
            o.on_stage_complete(stage, stats);
        }
    }

    fn on_warning(&self, warning: &PipelineWarning) {
        for o in &self.observers {
            o.on_warning(warning);
        }
    }

    fn on_failure(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(stage, severity, error);
        }
    }

    fn on_alert(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(stage, severity, error);
        }
    }
}

/// Forwards stage events and failures to `tracing`.
///
/// Warnings are already logged by the pipeline itself, so this observer only covers stage
/// completion and failures.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage_complete(&self, stage: PipelineStage, stats: StageStats) {
        tracing::info!(?stage, rows = stats.rows, "stage complete");
    }

    fn on_failure(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        tracing::error!(?stage, ?severity, %error, "stage failed");
    }

    fn on_alert(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        tracing::error!(?stage, ?severity, %error, alert = true, "stage failed");
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_stage_complete(&self, stage: PipelineStage, stats: StageStats) {
        self.append_line(&format!("{} ok stage={:?} rows={}", unix_ts(), stage, stats.rows));
    }

    fn on_warning(&self, warning: &PipelineWarning) {
        self.append_line(&format!(
            "{} warn severity={:?} {}",
            unix_ts(),
            warning.severity(),
            warning
        ));
    }

    fn on_failure(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        self.append_line(&format!(
            "{} fail severity={:?} stage={:?} err={}",
            unix_ts(),
            severity,
            stage,
            error
        ));
    }

    fn on_alert(&self, stage: PipelineStage, severity: PipelineSeverity, error: &PipelineError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={:?} err={}",
            unix_ts(),
            severity,
            stage,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
