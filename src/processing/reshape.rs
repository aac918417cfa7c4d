//! Wide ↔ long reshaping.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{LongRecord, Value, WideTable};

/// Flatten `value_columns` of `wide` into one [`LongRecord`] per (row, column).
///
/// Each value column header is the record's year and must parse as an integer; an unparseable
/// header aborts with [`PipelineError::InvalidYearHeader`]. Null value cells are kept as `None`;
/// a null, numeric or blank id cell is a [`PipelineError::ParseError`]. Records are emitted row
/// by row, columns in the order given.
pub fn melt<S: AsRef<str>>(
    wide: &WideTable,
    id_column: &str,
    value_columns: &[S],
) -> PipelineResult<Vec<LongRecord>> {
    let id_idx = column_index(wide, id_column)?;

    let mut columns = Vec::with_capacity(value_columns.len());
    for name in value_columns {
        let name = name.as_ref();
        let idx = column_index(wide, name)?;
        let year = name
            .trim()
            .parse::<i32>()
            .map_err(|_| PipelineError::InvalidYearHeader {
                column: name.to_owned(),
            })?;
        columns.push((idx, year));
    }

    let mut out = Vec::with_capacity(wide.row_count() * columns.len());
    for (row_idx, row) in wide.rows.iter().enumerate() {
        let id = row
            .get(id_idx)
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PipelineError::ParseError {
                row: row_idx + 1,
                column: id_column.to_owned(),
                raw: row.get(id_idx).map(|v| format!("{v:?}")).unwrap_or_default(),
                message: "id cell must be a non-empty string".to_string(),
            })?;
        for &(idx, year) in &columns {
            let value = row.get(idx).and_then(Value::as_f64);
            out.push(LongRecord::new(id, year, value));
        }
    }
    Ok(out)
}

/// Melt every year column, keyed on the country column.
pub fn melt_years(wide: &WideTable) -> PipelineResult<Vec<LongRecord>> {
    let id_column = wide
        .schema
        .fields
        .first()
        .map(|f| f.name.clone())
        .ok_or_else(|| PipelineError::SchemaMismatch {
            message: "wide table has no columns".to_string(),
        })?;
    melt(wide, &id_column, &wide.year_columns())
}

fn column_index(wide: &WideTable, name: &str) -> PipelineResult<usize> {
    wide.schema
        .index_of(name)
        .ok_or_else(|| PipelineError::SchemaMismatch {
            message: format!(
                "missing column '{name}'. columns={:?}",
                wide.schema.field_names().collect::<Vec<_>>()
            ),
        })
}

/// Country × year grid rebuilt from long records.
///
/// Countries and years iterate in ascending order. When a (country, year) key occurs more than
/// once, the first value wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    cells: BTreeMap<String, BTreeMap<i32, Option<f64>>>,
}

impl Pivot {
    /// Build a grid from `(country, year, value)` cells.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i32, Option<f64>)>,
    {
        let mut grid: BTreeMap<String, BTreeMap<i32, Option<f64>>> = BTreeMap::new();
        for (country, year, value) in cells {
            grid.entry(country.to_owned())
                .or_default()
                .entry(year)
                .or_insert(value);
        }
        Self { cells: grid }
    }

    /// `None` if the key is absent; `Some(None)` if present with a null value.
    pub fn get(&self, country: &str, year: i32) -> Option<Option<f64>> {
        self.cells.get(country)?.get(&year).copied()
    }

    /// Countries in ascending order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Every year present for at least one country.
    pub fn years(&self) -> BTreeSet<i32> {
        self.cells
            .values()
            .flat_map(|years| years.keys().copied())
            .collect()
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Pivot long records back into a country × year grid.
pub fn pivot(records: &[LongRecord]) -> Pivot {
    Pivot::from_cells(
        records
            .iter()
            .map(|r| (r.country.as_str(), r.year, r.value)),
    )
}

#[cfg(test)]
mod tests {
    use super::{melt, melt_years, pivot};
    use crate::error::PipelineError;
    use crate::types::{DataType, Field, LongRecord, Schema, Value, WideTable};

    fn sample_wide() -> WideTable {
        let schema = Schema::new(vec![
            Field::new("Country Name", DataType::Utf8),
            Field::new("Country Code", DataType::Utf8),
            Field::new("Indicator Name", DataType::Utf8),
            Field::new("Indicator Code", DataType::Utf8),
            Field::new("2001", DataType::Float64),
            Field::new("2002", DataType::Float64),
        ]);
        let row = |name: &str, a: Value, b: Value| {
            vec![
                Value::Utf8(name.to_string()),
                Value::Utf8("X".to_string()),
                Value::Utf8("pop".to_string()),
                Value::Utf8("SP".to_string()),
                a,
                b,
            ]
        };
        WideTable::new(
            schema,
            vec![
                row("MIMUW", Value::Float64(1.0), Value::Null),
                row("SKYHOLD", Value::Float64(3.0), Value::Float64(4.0)),
            ],
        )
    }

    #[test]
    fn melt_years_emits_one_record_per_cell_and_keeps_nulls() {
        let long = melt_years(&sample_wide()).unwrap();
        assert_eq!(
            long,
            vec![
                LongRecord::new("MIMUW", 2001, Some(1.0)),
                LongRecord::new("MIMUW", 2002, None),
                LongRecord::new("SKYHOLD", 2001, Some(3.0)),
                LongRecord::new("SKYHOLD", 2002, Some(4.0)),
            ]
        );
    }

    #[test]
    fn melt_selected_columns_only() {
        let long = melt(&sample_wide(), "Country Name", &["2002"]).unwrap();
        assert_eq!(long.len(), 2);
        assert!(long.iter().all(|r| r.year == 2002));
    }

    #[test]
    fn melt_rejects_non_year_value_column() {
        let err = melt(&sample_wide(), "Country Name", &["Indicator Code"]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidYearHeader { column } if column == "Indicator Code"));
    }

    #[test]
    fn melt_rejects_missing_id_column() {
        let err = melt(&sample_wide(), "Country", &["2001"]).unwrap_err();
        assert!(err.to_string().contains("missing column 'Country'"));
    }

    #[test]
    fn melt_rejects_null_id_cell() {
        let mut wide = sample_wide();
        wide.rows[1][1] = Value::Null;
        let err = melt(&wide, "Country Code", &["2001"]).unwrap_err();
        match err {
            PipelineError::ParseError { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Country Code");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn melt_rejects_blank_country() {
        let mut wide = sample_wide();
        wide.rows[0][0] = Value::Utf8(String::new());
        let err = melt_years(&wide).unwrap_err();
        assert!(matches!(err, PipelineError::ParseError { row: 1, .. }));
    }

    #[test]
    fn pivot_restores_cells() {
        let grid = pivot(&melt_years(&sample_wide()).unwrap());
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.get("MIMUW", 2001), Some(Some(1.0)));
        assert_eq!(grid.get("MIMUW", 2002), Some(None));
        assert_eq!(grid.get("MIMUW", 2003), None);
        assert_eq!(grid.years().into_iter().collect::<Vec<_>>(), vec![2001, 2002]);
    }

    #[test]
    fn pivot_keeps_first_duplicate() {
        let grid = pivot(&[
            LongRecord::new("A", 2000, Some(1.0)),
            LongRecord::new("A", 2000, Some(2.0)),
        ]);
        assert_eq!(grid.get("A", 2000), Some(Some(1.0)));
    }
}
