//! Rankings over the unified table.
//!
//! All functions are pure: they read the unified records, never modify them, and report
//! recoverable problems (misordered ranges, absent window years) as warnings before falling
//! back to the full year range.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::ingestion::observability::{PipelineStage, PipelineWarning, StageStats};
use crate::types::{GdpPerCapitaRecord, RankingRow, ReductionRow, UnifiedRecord};

use super::reshape::Pivot;
use super::AnalysisOptions;

/// Output of [`rank_co2_change`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Co2Change {
    /// Largest reductions first (most negative delta first).
    pub top_reducers: Vec<ReductionRow>,
    /// Largest increases first (most positive delta first).
    pub top_increasers: Vec<ReductionRow>,
}

/// Top `options.top_k` countries per year by per-capita CO2.
///
/// Rows are ordered by year ascending, then per-capita CO2 descending; equal values keep their
/// input order and missing values sort last. Only years in `[start_year, end_year]` are returned
/// (defaults: the first and last year present). If `start_year > end_year` a
/// [`PipelineWarning::InvalidYearRange`] is reported and the full range is used.
pub fn rank_by_co2_per_capita(
    records: &[UnifiedRecord],
    start_year: Option<i32>,
    end_year: Option<i32>,
    options: &AnalysisOptions,
) -> Vec<RankingRow> {
    let rows = records
        .iter()
        .map(|r| RankingRow {
            year: r.year,
            country: r.country.clone(),
            value: r.total_co2,
            per_capita: r.co2_per_capita,
        })
        .collect();
    let ranked = top_per_year(rows, start_year, end_year, options);
    options.stage_complete(PipelineStage::RankCo2PerCapita, StageStats { rows: ranked.len() });
    ranked
}

/// Augmented copies of `records` carrying `GDP / Population`.
///
/// Missing GDP, missing population or zero population give `None`.
pub fn with_gdp_per_capita(records: &[UnifiedRecord]) -> Vec<GdpPerCapitaRecord> {
    records
        .iter()
        .map(|r| GdpPerCapitaRecord {
            record: r.clone(),
            gdp_per_capita: per_capita(r.gdp, r.population),
        })
        .collect()
}

fn per_capita(value: Option<f64>, population: Option<f64>) -> Option<f64> {
    match (value, population) {
        (Some(v), Some(p)) if p != 0.0 => Some(v / p).filter(|x| x.is_finite()),
        _ => None,
    }
}

/// Top `options.top_k` countries per year by GDP per capita.
///
/// Same ordering, range and fallback contract as [`rank_by_co2_per_capita`]. `value` holds the
/// GDP and `per_capita` the derived GDP per capita.
pub fn rank_by_gdp_per_capita(
    records: &[UnifiedRecord],
    start_year: Option<i32>,
    end_year: Option<i32>,
    options: &AnalysisOptions,
) -> Vec<RankingRow> {
    let rows = with_gdp_per_capita(records)
        .into_iter()
        .map(|r| RankingRow {
            year: r.record.year,
            country: r.record.country,
            value: r.record.gdp,
            per_capita: r.gdp_per_capita,
        })
        .collect();
    let ranked = top_per_year(rows, start_year, end_year, options);
    options.stage_complete(PipelineStage::RankGdpPerCapita, StageStats { rows: ranked.len() });
    ranked
}

/// Rank per-capita CO2 for several year windows in parallel.
///
/// Results are returned in the order of `windows`.
pub fn rank_co2_per_capita_windows(
    records: &[UnifiedRecord],
    windows: &[(Option<i32>, Option<i32>)],
    options: &AnalysisOptions,
) -> Vec<Vec<RankingRow>> {
    windows
        .par_iter()
        .map(|&(start, end)| rank_by_co2_per_capita(records, start, end, options))
        .collect()
}

/// Countries with the largest per-capita CO2 reduction and increase over a window.
///
/// `delta = value[up_to_year] - value[up_to_year - window_years]`; countries missing either
/// endpoint are dropped. `up_to_year` defaults to the last year present and `window_years` to
/// `options.window_years`. If either endpoint year is absent from the data, a
/// [`PipelineWarning::MissingWindowYear`] is reported and the span from the first to the last
/// year present is used instead.
///
/// With fewer than `2 * top_k` countries the two lists overlap.
pub fn rank_co2_change(
    records: &[UnifiedRecord],
    up_to_year: Option<i32>,
    window_years: Option<i32>,
    options: &AnalysisOptions,
) -> Co2Change {
    let grid = Pivot::from_cells(
        records
            .iter()
            .map(|r| (r.country.as_str(), r.year, r.co2_per_capita)),
    );
    let years = grid.years();
    let (Some(&first), Some(&last)) = (years.first(), years.last()) else {
        return Co2Change::default();
    };

    let end = up_to_year.unwrap_or(last);
    let start = end.saturating_sub(window_years.unwrap_or(options.window_years));
    let (start, end) = if years.contains(&start) && years.contains(&end) {
        (start, end)
    } else {
        options.warn(PipelineWarning::MissingWindowYear {
            up_to_year: end,
            window_start: start,
        });
        (first, last)
    };

    let mut deltas: Vec<ReductionRow> = grid
        .countries()
        .filter_map(|country| {
            let after = grid.get(country, end).flatten()?;
            let before = grid.get(country, start).flatten()?;
            let delta = after - before;
            (!delta.is_nan()).then(|| ReductionRow {
                country: country.to_owned(),
                delta,
            })
        })
        .collect();
    deltas.sort_by(|a, b| a.delta.total_cmp(&b.delta));

    let k = options.top_k.min(deltas.len());
    let top_reducers = deltas[..k].to_vec();
    let mut top_increasers = deltas[deltas.len() - k..].to_vec();
    top_increasers.sort_by(|a, b| b.delta.total_cmp(&a.delta));

    options.stage_complete(
        PipelineStage::RankCo2Change,
        StageStats {
            rows: top_reducers.len() + top_increasers.len(),
        },
    );
    Co2Change {
        top_reducers,
        top_increasers,
    }
}

fn top_per_year(
    mut rows: Vec<RankingRow>,
    start_year: Option<i32>,
    end_year: Option<i32>,
    options: &AnalysisOptions,
) -> Vec<RankingRow> {
    let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
    let (Some(&first), Some(&last)) = (years.first(), years.last()) else {
        return Vec::new();
    };

    let mut start = start_year.unwrap_or(first);
    let mut end = end_year.unwrap_or(last);
    if start > end {
        options.warn(PipelineWarning::InvalidYearRange { start, end });
        (start, end) = (first, last);
    }

    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| descending_nulls_last(a.per_capita, b.per_capita))
    });

    let mut out = Vec::new();
    let mut current: Option<(i32, usize)> = None;
    for row in rows {
        let taken = match current {
            Some((year, n)) if year == row.year => n,
            _ => 0,
        };
        current = Some((row.year, taken + 1));
        if taken < options.top_k && (start..=end).contains(&row.year) {
            out.push(row);
        }
    }
    out
}

fn descending_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|v| !v.is_nan());
    let b = b.filter(|v| !v.is_nan());
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{rank_by_co2_per_capita, rank_by_gdp_per_capita, rank_co2_change, with_gdp_per_capita};
    use crate::ingestion::observability::{PipelineObserver, PipelineWarning};
    use crate::processing::AnalysisOptions;
    use crate::types::UnifiedRecord;

    #[derive(Default)]
    struct RecordingObserver {
        warnings: Mutex<Vec<PipelineWarning>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn on_warning(&self, warning: &PipelineWarning) {
            self.warnings.lock().unwrap().push(warning.clone());
        }
    }

    fn rec(country: &str, year: i32, population: Option<f64>, gdp: Option<f64>, per_capita: Option<f64>) -> UnifiedRecord {
        UnifiedRecord {
            country: country.to_string(),
            year,
            population,
            gdp,
            total_co2: per_capita.map(|v| v * 10.0),
            co2_per_capita: per_capita,
        }
    }

    #[test]
    fn ties_keep_input_order_and_nulls_sort_last() {
        let records = vec![
            rec("A", 2000, None, None, None),
            rec("B", 2000, None, None, Some(1.0)),
            rec("C", 2000, None, None, Some(2.0)),
            rec("D", 2000, None, None, Some(1.0)),
        ];
        let ranked = rank_by_co2_per_capita(&records, None, None, &AnalysisOptions::default());
        let order: Vec<_> = ranked.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "D", "A"]);
    }

    #[test]
    fn keeps_top_k_per_year() {
        let records: Vec<_> = (0..7)
            .map(|i| rec(&format!("C{i}"), 2000, None, None, Some(i as f64)))
            .collect();
        let options = AnalysisOptions {
            top_k: 3,
            ..Default::default()
        };
        let ranked = rank_by_co2_per_capita(&records, None, None, &options);
        let order: Vec<_> = ranked.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(order, vec!["C6", "C5", "C4"]);
    }

    #[test]
    fn misordered_range_warns_and_uses_full_range() {
        let records = vec![
            rec("A", 2000, None, None, Some(1.0)),
            rec("A", 2001, None, None, Some(2.0)),
        ];
        let obs = Arc::new(RecordingObserver::default());
        let options = AnalysisOptions::default().with_observer(obs.clone());

        let ranked = rank_by_co2_per_capita(&records, Some(2001), Some(2000), &options);

        assert_eq!(ranked, rank_by_co2_per_capita(&records, None, None, &AnalysisOptions::default()));
        assert_eq!(
            *obs.warnings.lock().unwrap(),
            vec![PipelineWarning::InvalidYearRange { start: 2001, end: 2000 }]
        );
    }

    #[test]
    fn gdp_per_capita_is_a_new_copy_with_nulls_for_zero_population() {
        let records = vec![
            rec("A", 2000, Some(4.0), Some(8.0), None),
            rec("B", 2000, Some(0.0), Some(8.0), None),
            rec("C", 2000, None, Some(8.0), None),
        ];
        let augmented = with_gdp_per_capita(&records);
        let values: Vec<_> = augmented.iter().map(|r| r.gdp_per_capita).collect();
        assert_eq!(values, vec![Some(2.0), None, None]);
        assert_eq!(augmented[0].record, records[0]);
    }

    #[test]
    fn gdp_ranking_reports_gdp_and_per_capita() {
        let records = vec![
            rec("A", 2000, Some(4.0), Some(8.0), None),
            rec("B", 2000, Some(1.0), Some(5.0), None),
            rec("Z", 2000, Some(0.0), Some(50.0), None),
        ];
        let ranked = rank_by_gdp_per_capita(&records, None, None, &AnalysisOptions::default());
        let got: Vec<_> = ranked
            .iter()
            .map(|r| (r.country.as_str(), r.value, r.per_capita))
            .collect();
        assert_eq!(
            got,
            vec![
                ("B", Some(5.0), Some(5.0)),
                ("A", Some(8.0), Some(2.0)),
                ("Z", Some(50.0), None),
            ]
        );
    }

    #[test]
    fn change_ranking_orders_both_lists() {
        let mut records = Vec::new();
        for (i, delta) in [-3.0, 5.0, -1.0, 2.0].into_iter().enumerate() {
            let country = format!("C{i}");
            records.push(rec(&country, 2000, None, None, Some(10.0)));
            records.push(rec(&country, 2010, None, None, Some(10.0 + delta)));
        }
        let options = AnalysisOptions {
            top_k: 2,
            ..Default::default()
        };
        let change = rank_co2_change(&records, Some(2010), None, &options);
        let reducers: Vec<_> = change.top_reducers.iter().map(|r| (r.country.as_str(), r.delta)).collect();
        let increasers: Vec<_> = change.top_increasers.iter().map(|r| (r.country.as_str(), r.delta)).collect();
        assert_eq!(reducers, vec![("C0", -3.0), ("C2", -1.0)]);
        assert_eq!(increasers, vec![("C1", 5.0), ("C3", 2.0)]);
    }

    #[test]
    fn change_ranking_drops_countries_missing_an_endpoint() {
        let records = vec![
            rec("A", 2000, None, None, Some(1.0)),
            rec("A", 2001, None, None, Some(3.0)),
            rec("B", 2000, None, None, Some(1.0)),
            rec("B", 2001, None, None, None),
            rec("C", 2001, None, None, Some(1.0)),
        ];
        let change = rank_co2_change(&records, Some(2001), Some(1), &AnalysisOptions::default());
        assert_eq!(change.top_reducers.len(), 1);
        assert_eq!(change.top_reducers[0].country, "A");
        assert_eq!(change.top_increasers, change.top_reducers);
    }

    #[test]
    fn change_ranking_with_absent_year_falls_back_to_full_span() {
        let records = vec![
            rec("A", 2000, None, None, Some(1.0)),
            rec("A", 2003, None, None, Some(4.0)),
        ];
        let obs = Arc::new(RecordingObserver::default());
        let options = AnalysisOptions::default().with_observer(obs.clone());

        let change = rank_co2_change(&records, Some(2003), Some(10), &options);

        assert_eq!(change.top_reducers[0].delta, 3.0);
        assert_eq!(
            *obs.warnings.lock().unwrap(),
            vec![PipelineWarning::MissingWindowYear {
                up_to_year: 2003,
                window_start: 1993
            }]
        );
    }

    #[test]
    fn empty_input_yields_empty_rankings() {
        let options = AnalysisOptions::default();
        assert!(rank_by_co2_per_capita(&[], Some(2005), Some(2000), &options).is_empty());
        assert_eq!(rank_co2_change(&[], None, None, &options), Default::default());
    }
}
