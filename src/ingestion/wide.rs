//! Parser for World Bank style wide CSV exports (population, GDP).
//!
//! These files are not valid CSV in the usual sense. Two layouts occur in practice:
//!
//! - single-quoted: `Korea, Rep.,"KOR","GDP (current US$)","NY.GDP.MKTP.CD","1.2e12",`
//! - doubly-quoted, where the whole record is wrapped in quotes and inner quotes are doubled:
//!   `"Korea, Rep.,""KOR"",""Population, total"",""SP.POP.TOTL"",""51744876"","`
//!
//! In both, the country name is unquoted and may contain commas, so a field boundary is a comma
//! followed by a quote. Everything before the first boundary is the country name.

use std::io::BufRead;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataType, Field, Schema, Value, WideTable, DESCRIPTOR_COLUMNS};

/// Options for reading a wide source from a file or reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WideCsvOptions {
    /// Leading lines to drop before the header (raw World Bank downloads carry 4 metadata lines).
    pub skip_lines: usize,
}

/// Read and parse a wide source file.
pub fn read_wide_from_path(
    path: impl AsRef<Path>,
    options: &WideCsvOptions,
) -> PipelineResult<WideTable> {
    let file = std::fs::File::open(path)?;
    read_wide_from_reader(std::io::BufReader::new(file), options)
}

/// Read and parse a wide source from any buffered reader.
pub fn read_wide_from_reader<R: BufRead>(
    reader: R,
    options: &WideCsvOptions,
) -> PipelineResult<WideTable> {
    let lines = reader
        .lines()
        .skip(options.skip_lines)
        .collect::<Result<Vec<_>, _>>()?;
    parse_wide_lines(&lines, options.skip_lines)
}

/// Parse raw lines of a wide source into a rectangular [`WideTable`].
///
/// The first non-empty line is the header. The resulting table always has the country column
/// first, followed by code, indicator name, indicator code and one `Float64` column per year.
///
/// Country names are upper-cased. Empty cells become [`Value::Null`]; a non-empty year cell that
/// is not a number is a [`PipelineError::ParseError`]. A row whose field count differs from the
/// header's is a [`PipelineError::Structural`] error.
pub fn parse_wide<I, S>(raw_lines: I) -> PipelineResult<WideTable>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<S> = raw_lines.into_iter().collect();
    parse_wide_lines(&lines, 0)
}

fn parse_wide_lines<S: AsRef<str>>(lines: &[S], line_offset: usize) -> PipelineResult<WideTable> {
    let mut records = lines
        .iter()
        .enumerate()
        // Report 1-based line numbers relative to the original input.
        .map(|(idx, line)| (idx + line_offset + 1, line.as_ref()))
        .filter(|(_, line)| !line.trim_end_matches(['\r', '\n']).trim().is_empty());

    let (header_line, header_raw) = records.next().ok_or_else(|| PipelineError::Structural {
        line: line_offset,
        message: "input has no header row".to_string(),
    })?;
    let header = split_record(header_raw);
    if header.len() < DESCRIPTOR_COLUMNS {
        return Err(PipelineError::Structural {
            line: header_line,
            message: format!(
                "header has {} columns; expected at least {DESCRIPTOR_COLUMNS} descriptive columns",
                header.len()
            ),
        });
    }

    let schema = Schema::new(
        header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let data_type = if idx >= DESCRIPTOR_COLUMNS {
                    DataType::Float64
                } else {
                    DataType::Utf8
                };
                Field::new(name.clone().unwrap_or_default(), data_type)
            })
            .collect(),
    );

    let mut rows = Vec::new();
    for (line_no, raw) in records {
        let fields = split_record(raw);
        if fields.len() != schema.len() {
            return Err(PipelineError::Structural {
                line: line_no,
                message: format!(
                    "row has {} fields but the header has {}",
                    fields.len(),
                    schema.len()
                ),
            });
        }

        let mut row = Vec::with_capacity(fields.len());
        for (idx, (field, cell)) in schema.fields.iter().zip(fields).enumerate() {
            let value = match (idx, field.data_type, cell) {
                (0, _, cell) => Value::Utf8(normalize_country(cell.as_deref().unwrap_or(""))),
                (_, _, None) => Value::Null,
                (_, DataType::Utf8, Some(text)) => Value::Utf8(text),
                (_, DataType::Float64, Some(text)) => parse_number(line_no, &field.name, &text)?,
            };
            row.push(value);
        }
        rows.push(row);
    }

    Ok(WideTable::new(schema, rows))
}

/// Upper-case a country name and drop stray line endings and quotes.
pub fn normalize_country(raw: &str) -> String {
    raw.trim_matches(|c| c == '\r' || c == '\n' || c == '"')
        .trim()
        .to_uppercase()
}

fn parse_number(row: usize, column: &str, raw: &str) -> PipelineResult<Value> {
    raw.trim()
        .parse::<f64>()
        .map(Value::Float64)
        .map_err(|e| PipelineError::ParseError {
            row,
            column: column.to_owned(),
            raw: raw.to_owned(),
            message: e.to_string(),
        })
}

/// Split one record into cells; `None` is the null marker for an empty cell.
fn split_record(line: &str) -> Vec<Option<String>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let cells = if is_doubly_quoted(line) {
        split_doubly_quoted(line)
    } else {
        split_single_quoted(line)
    };
    cells
        .into_iter()
        .map(|cell| if cell.is_empty() { None } else { Some(cell) })
        .collect()
}

/// A doubly-quoted record has at least one `,""` that opens a field rather than being an empty
/// single-quoted `""` cell.
fn is_doubly_quoted(line: &str) -> bool {
    line.match_indices(",\"\"").any(|(idx, pat)| {
        !matches!(line[idx + pat.len()..].chars().next(), None | Some(','))
    })
}

fn split_single_quoted(line: &str) -> Vec<String> {
    let mut parts = line.split(",\"");
    let mut cells = Vec::new();
    if let Some(country) = parts.next() {
        cells.push(country.trim_matches('"').to_string());
    }
    cells.extend(parts.map(|p| p.trim_matches(|c| c == '"' || c == ',').to_string()));
    cells
}

/// Comma-delimited tokens that open with `""` start a data cell; a token that does not open
/// with `""` continues the open cell (a comma inside a quoted value) or, when no cell is open,
/// belongs to the country name.
fn split_doubly_quoted(line: &str) -> Vec<String> {
    let mut country: Vec<&str> = Vec::new();
    let mut data: Vec<String> = Vec::new();
    let mut open = false;

    for token in line.split(',') {
        if token.starts_with("\"\"") {
            data.push(token.to_string());
            open = !closes_cell(token);
        } else if open {
            if let Some(current) = data.last_mut() {
                current.push(',');
                current.push_str(token);
            }
            open = !token.ends_with("\"\"");
        } else {
            let part = token.trim_matches(|c| c == '"' || c == '\r' || c == '\n');
            if !part.is_empty() {
                country.push(part);
            }
        }
    }

    let mut cells = Vec::with_capacity(data.len() + 1);
    cells.push(country.join(","));
    cells.extend(data.into_iter().map(|cell| cell.trim_matches('"').to_string()));
    cells
}

/// Whether a token that opened with `""` also closes its cell (`""ABW""`, `""""`).
fn closes_cell(token: &str) -> bool {
    token.len() >= 4 && token.ends_with("\"\"")
}
