use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use co2_analysis::ingestion::parse_wide;
use co2_analysis::ingestion::{PipelineObserver, PipelineWarning};
use co2_analysis::processing::{melt_years, merge, AnalysisOptions};
use co2_analysis::types::{Co2Record, LongRecord};

#[derive(Default)]
struct RecordingObserver {
    warnings: Mutex<Vec<PipelineWarning>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_warning(&self, warning: &PipelineWarning) {
        self.warnings.lock().unwrap().push(warning.clone());
    }
}

const HEADER: &str = "Country Name,\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"2001\",";

fn toy_population() -> Vec<LongRecord> {
    let wide = parse_wide([
        HEADER,
        "Hogwarts,\"HG\",\"magic\",\"ma\",\"\",",
        "Mimuw,\"MIM\",\"magic\",\"ma\",\"123\",",
        "Skyhold,\"DA\",\"magic\",\"ma\",\"0\",",
    ])
    .unwrap();
    melt_years(&wide).unwrap()
}

fn toy_gdp() -> Vec<LongRecord> {
    let wide = parse_wide([
        HEADER,
        "Quito,\"EC\",\"python\",\"py\",\"\",",
        "Mimuw,\"MIM\",\"python\",\"py\",\"123213\",",
        "Skyhold,\"DA\",\"python\",\"py\",\"312340\",",
    ])
    .unwrap();
    melt_years(&wide).unwrap()
}

fn toy_co2() -> Vec<Co2Record> {
    let totals = [12.0, 321.0, 23123.0, 43342.0, 1232312.0, 212122.0];
    let per_capita = [0.1, 0.32, 0.213, 0.1232, 0.2332, 0.234];
    (0..6)
        .map(|i| Co2Record::new("MIMUW", 2000 + i as i32, Some(totals[i]), Some(per_capita[i])))
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn toy_sources_join_to_the_single_shared_row() {
    let merged = merge(&toy_population(), &toy_gdp(), &toy_co2(), &AnalysisOptions::default());

    assert_eq!(merged.records.len(), 1);
    let row = &merged.records[0];
    assert_eq!(row.country, "MIMUW");
    assert_eq!(row.year, 2001);
    assert_eq!(row.population, Some(123.0));
    assert_eq!(row.gdp, Some(123213.0));
    assert_eq!(row.total_co2, Some(321.0));
    assert_eq!(row.co2_per_capita, Some(0.32));
    assert_eq!(merged.excluded_countries, set(&["HOGWARTS", "QUITO", "SKYHOLD"]));
}

#[test]
fn excluded_is_union_minus_intersection() {
    let population = vec![
        LongRecord::new("Mimuw", 2001, Some(1.0)),
        LongRecord::new("Hogwarts", 2001, Some(1.0)),
        LongRecord::new("Skyhold", 2001, Some(1.0)),
    ];
    let gdp = vec![
        LongRecord::new("MIMUW", 2001, Some(1.0)),
        LongRecord::new("HOGWARTS", 2001, Some(1.0)),
    ];
    let co2 = vec![
        Co2Record::new("mimuw", 2001, Some(1.0), Some(1.0)),
        Co2Record::new("skyhold", 2001, Some(1.0), Some(1.0)),
    ];
    let obs = Arc::new(RecordingObserver::default());
    let options = AnalysisOptions::default().with_observer(obs.clone());

    let merged = merge(&population, &gdp, &co2, &options);

    assert_eq!(merged.records.len(), 1);
    assert_eq!(merged.excluded_countries, set(&["HOGWARTS", "SKYHOLD"]));
    assert_eq!(
        *obs.warnings.lock().unwrap(),
        vec![PipelineWarning::ExcludedCountries {
            countries: vec!["HOGWARTS".to_string(), "SKYHOLD".to_string()],
        }]
    );
}

#[test]
fn full_coverage_reports_no_warning() {
    let obs = Arc::new(RecordingObserver::default());
    let options = AnalysisOptions::default().with_observer(obs.clone());
    let merged = merge(
        &[LongRecord::new("A", 2001, Some(1.0))],
        &[LongRecord::new("A", 2002, Some(1.0))],
        &[Co2Record::new("A", 2003, None, None)],
        &options,
    );
    assert!(merged.records.is_empty());
    assert!(merged.excluded_countries.is_empty());
    assert!(obs.warnings.lock().unwrap().is_empty());
}

#[test]
fn merged_countries_are_within_every_source() {
    let population = toy_population();
    let gdp = toy_gdp();
    let co2 = toy_co2();
    let merged = merge(&population, &gdp, &co2, &AnalysisOptions::default());

    let in_all = |country: &str| {
        population.iter().any(|r| r.country.eq_ignore_ascii_case(country))
            && gdp.iter().any(|r| r.country.eq_ignore_ascii_case(country))
            && co2.iter().any(|r| r.country.eq_ignore_ascii_case(country))
    };
    assert!(merged.records.iter().all(|r| in_all(&r.country)));
}
