//! Three-way inner join of population, GDP and CO2 on (country, year).

use std::collections::{BTreeSet, HashMap};

use crate::ingestion::observability::{PipelineStage, PipelineWarning, StageStats};
use crate::types::{Co2Record, LongRecord, UnifiedRecord};

use super::AnalysisOptions;

/// Result of [`merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Merged {
    /// Joined rows, in population-source order.
    pub records: Vec<UnifiedRecord>,
    /// Countries present in at least one source but not in all three.
    pub excluded_countries: BTreeSet<String>,
}

type Key = (String, i32);

fn key(country: &str, year: i32) -> Key {
    (normalize(country), year)
}

fn normalize(country: &str) -> String {
    country.trim().to_uppercase()
}

/// Inner-join the three sources on upper-cased (country, year).
///
/// Only keys present in all three sources survive. A key repeated within a source yields one
/// row per matching combination. Countries missing from some source are collected into
/// [`Merged::excluded_countries`] and reported as a [`PipelineWarning::ExcludedCountries`];
/// this never changes which rows are joined.
pub fn merge(
    population: &[LongRecord],
    gdp: &[LongRecord],
    co2: &[Co2Record],
    options: &AnalysisOptions,
) -> Merged {
    let mut gdp_by_key: HashMap<Key, Vec<Option<f64>>> = HashMap::new();
    for r in gdp {
        gdp_by_key.entry(key(&r.country, r.year)).or_default().push(r.value);
    }
    let mut co2_by_key: HashMap<Key, Vec<&Co2Record>> = HashMap::new();
    for r in co2 {
        co2_by_key.entry(key(&r.country, r.year)).or_default().push(r);
    }

    let mut records = Vec::new();
    for p in population {
        let k = key(&p.country, p.year);
        let (Some(gdps), Some(emissions)) = (gdp_by_key.get(&k), co2_by_key.get(&k)) else {
            continue;
        };
        for &gdp_value in gdps {
            for e in emissions {
                records.push(UnifiedRecord {
                    country: k.0.clone(),
                    year: k.1,
                    population: p.value,
                    gdp: gdp_value,
                    total_co2: e.total,
                    co2_per_capita: e.per_capita,
                });
            }
        }
    }

    let excluded_countries = excluded(
        &country_set(population.iter().map(|r| r.country.as_str())),
        &country_set(gdp.iter().map(|r| r.country.as_str())),
        &country_set(co2.iter().map(|r| r.country.as_str())),
    );
    if !excluded_countries.is_empty() {
        options.warn(PipelineWarning::ExcludedCountries {
            countries: excluded_countries.iter().cloned().collect(),
        });
    }
    options.stage_complete(PipelineStage::Merge, StageStats { rows: records.len() });

    Merged {
        records,
        excluded_countries,
    }
}

fn country_set<'a>(countries: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    countries.map(normalize).collect()
}

/// Union minus intersection of the three country sets.
fn excluded(a: &BTreeSet<String>, b: &BTreeSet<String>, c: &BTreeSet<String>) -> BTreeSet<String> {
    a.iter()
        .chain(b)
        .chain(c)
        .filter(|country| !(a.contains(*country) && b.contains(*country) && c.contains(*country)))
        .cloned()
        .collect()
}
