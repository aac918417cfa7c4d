//! Core data model types.
//!
//! Wide sources are parsed into a [`WideTable`] (a [`Schema`] plus rows of typed [`Value`]s),
//! flattened into [`LongRecord`]s, joined into [`UnifiedRecord`]s and finally ranked into
//! [`RankingRow`]s / [`ReductionRow`]s.

use serde::{Deserialize, Serialize};

/// Number of descriptive columns (name, code, indicator name, indicator code) preceding the
/// year columns of a wide table.
pub const DESCRIPTOR_COLUMNS: usize = 4;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name. Empty header cells produce an empty name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the column layout of a [`WideTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single parsed cell.
///
/// The variant is decided at parse time; downstream stages never re-infer types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Numeric view of the cell; `Null` and strings yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of the cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Rectangular wide-format table: one row per country, one column per year.
///
/// Invariant: every row has exactly `schema.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Column layout taken from the header row.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl WideTable {
    /// Create a table from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Names of the year columns (everything after the descriptive columns).
    pub fn year_columns(&self) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .skip(DESCRIPTOR_COLUMNS)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Country names in row order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_str))
    }
}

/// One (country, year, value) observation of a long-format table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}

impl LongRecord {
    pub fn new(country: impl Into<String>, year: i32, value: Option<f64>) -> Self {
        Self {
            country: country.into(),
            year,
            value,
        }
    }
}

/// A row of the tidy CO2 source (`Country,Year,Total,Per Capita`).
///
/// Extra columns in the source file are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2Record {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Total")]
    pub total: Option<f64>,
    #[serde(rename = "Per Capita")]
    pub per_capita: Option<f64>,
}

impl Co2Record {
    pub fn new(
        country: impl Into<String>,
        year: i32,
        total: Option<f64>,
        per_capita: Option<f64>,
    ) -> Self {
        Self {
            country: country.into(),
            year,
            total,
            per_capita,
        }
    }
}

/// A (country, year) observation present in all three sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Population")]
    pub population: Option<f64>,
    #[serde(rename = "GDP")]
    pub gdp: Option<f64>,
    #[serde(rename = "Total")]
    pub total_co2: Option<f64>,
    #[serde(rename = "Per Capita")]
    pub co2_per_capita: Option<f64>,
}

/// A [`UnifiedRecord`] augmented with the derived GDP-per-capita value.
#[derive(Debug, Clone, PartialEq)]
pub struct GdpPerCapitaRecord {
    pub record: UnifiedRecord,
    /// `GDP / Population`; `None` when either is missing or population is zero.
    pub gdp_per_capita: Option<f64>,
}

/// One ranked (year, country) entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Country")]
    pub country: String,
    /// The absolute metric (total CO2 or GDP).
    #[serde(rename = "Value")]
    pub value: Option<f64>,
    /// The per-capita metric the ranking is sorted by.
    #[serde(rename = "Per Capita")]
    pub per_capita: Option<f64>,
}

/// Change of per-capita CO2 for one country over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionRow {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Delta")]
    pub delta: f64,
}
