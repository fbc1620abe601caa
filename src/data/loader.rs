use std::fmt;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{LoadError, Result};
use super::model::PlantingRow;

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["plot_id", "species", "system", "date", "tree_count"];

/// Optional column; derived from `date` when absent.
pub const YEAR_COLUMN: &str = "year";

/// Optional column carrying measured survivors.
pub const SURVIVED_COLUMN: &str = "survived_count";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load planting rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the required columns
/// * `.json`    – `[{ "plot_id": ..., "species": ..., ... }, ...]`
/// * `.parquet` – one column per field; dates may be `Date32`/`Date64`/timestamps
pub fn load_file(path: &Path) -> Result<Vec<PlantingRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv_table(std::fs::File::open(path)?)?,
        "json" => json_table(&std::fs::read_to_string(path)?)?,
        "parquet" | "pq" => parquet_table(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    table.into_rows()
}

/// Parse CSV text from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<PlantingRow>> {
    read_csv_table(reader)?.into_rows()
}

/// Parse a records-oriented JSON document.
pub fn read_json(text: &str) -> Result<Vec<PlantingRow>> {
    json_table(text)?.into_rows()
}

/// Parse a calendar date in any of the accepted spellings.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

// ---------------------------------------------------------------------------
// Cell / RawTable – format-independent intermediate form
// ---------------------------------------------------------------------------

/// A single source cell, typed as loosely as the source allows.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            // Integral floats within f64's exact integer range print without a fraction.
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 2f64.powi(53) => {
                write!(f, "{}", *v as i64)
            }
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Date(d) => write!(f, "{d}"),
            Cell::Null => write!(f, ""),
        }
    }
}

/// Column names plus row-major cells.
#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Validate the schema and interpret every row.
    fn into_rows(self) -> Result<Vec<PlantingRow>> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.index_of(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema { missing });
        }

        let [plot_idx, species_idx, system_idx, date_idx, count_idx] =
            REQUIRED_COLUMNS.map(|c| self.index_of(c).unwrap_or_default());
        let year_idx = self.index_of(YEAR_COLUMN);
        let survived_idx = self.index_of(SURVIVED_COLUMN);

        let mut out = Vec::with_capacity(self.rows.len());

        for (i, cells) in self.rows.iter().enumerate() {
            let mut row = RowReader {
                row: i + 1,
                cells,
                plot_id: None,
            };

            let plot_id = row.text(plot_idx, "plot_id")?;
            row.plot_id = Some(plot_id.clone());

            let species = row.text(species_idx, "species")?;
            let system = row.text(system_idx, "system")?;
            let date = row.date(date_idx, "date")?;
            let tree_count = row.count(count_idx, "tree_count")?;

            let year = match year_idx.map(|idx| (idx, row.cell(idx))) {
                Some((idx, cell)) if *cell != Cell::Null => {
                    let year = row.year(idx, YEAR_COLUMN)?;
                    if year != date.year() {
                        return Err(LoadError::YearMismatch {
                            row: row.row,
                            year,
                            date,
                        });
                    }
                    year
                }
                _ => date.year(),
            };

            let recorded_survived = match survived_idx {
                Some(idx) if *row.cell(idx) != Cell::Null => {
                    Some(row.count(idx, SURVIVED_COLUMN)?)
                }
                _ => None,
            };

            out.push(PlantingRow {
                plot_id,
                species,
                system,
                date,
                year,
                tree_count,
                recorded_survived,
            });
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Per-row field interpretation
// ---------------------------------------------------------------------------

struct RowReader<'a> {
    row: usize,
    cells: &'a [Cell],
    plot_id: Option<String>,
}

impl RowReader<'_> {
    fn cell(&self, idx: usize) -> &Cell {
        self.cells.get(idx).unwrap_or(&Cell::Null)
    }

    fn error(&self, column: &str, cell: &Cell, reason: &str) -> LoadError {
        LoadError::Parse {
            row: self.row,
            plot_id: self.plot_id.clone(),
            column: column.to_string(),
            value: cell.to_string(),
            reason: reason.to_string(),
        }
    }

    fn text(&self, idx: usize, column: &str) -> Result<String> {
        match self.cell(idx) {
            Cell::Null => Err(self.error(column, &Cell::Null, "missing value")),
            Cell::Text(s) if s.is_empty() => Err(self.error(column, &Cell::Null, "missing value")),
            cell => Ok(cell.to_string()),
        }
    }

    fn integer(&self, idx: usize, column: &str) -> Result<i64> {
        let cell = self.cell(idx);
        let value = match cell {
            Cell::Integer(i) => Some(*i),
            Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                }),
            Cell::Null => return Err(self.error(column, cell, "missing value")),
            _ => None,
        };
        value.ok_or_else(|| self.error(column, cell, "not an integer"))
    }

    fn count(&self, idx: usize, column: &str) -> Result<u32> {
        let value = self.integer(idx, column)?;
        u32::try_from(value)
            .map_err(|_| self.error(column, self.cell(idx), "not a non-negative count"))
    }

    fn year(&self, idx: usize, column: &str) -> Result<i32> {
        let value = self.integer(idx, column)?;
        i32::try_from(value).map_err(|_| self.error(column, self.cell(idx), "year out of range"))
    }

    fn date(&self, idx: usize, column: &str) -> Result<NaiveDate> {
        let cell = self.cell(idx);
        match cell {
            Cell::Date(d) => Ok(*d),
            Cell::Text(s) => {
                parse_date(s).ok_or_else(|| self.error(column, cell, "not a calendar date"))
            }
            Cell::Null => Err(self.error(column, cell, "missing value")),
            _ => Err(self.error(column, cell, "not a calendar date")),
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one planting observation per
/// line. Every cell is read as text; typing happens in [`RawTable::into_rows`].
fn read_csv_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(value.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "plot_id": 1, "species": "Oak", "system": "A", "date": "2020-01-01", "tree_count": 10 },
///   ...
/// ]
/// ```
///
/// Keys missing from an object are read as nulls.
fn json_table(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut table = RawTable::default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {} is not a JSON object", i + 1)))?;
        for key in obj.keys() {
            if table.index_of(key.trim()).is_none() {
                table.columns.push(key.trim().to_string());
            }
        }
    }

    for rec in records {
        let mut cells = vec![Cell::Null; table.columns.len()];
        if let Some(obj) = rec.as_object() {
            for (key, val) in obj {
                if let Some(idx) = table.index_of(key.trim()) {
                    cells[idx] = json_to_cell(val);
                }
            }
        }
        table.rows.push(cells);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) if s.trim().is_empty() => Cell::Null,
        JsonValue::String(s) => Cell::Text(s.trim().to_string()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of planting records.
///
/// Text columns may be `Utf8`/`LargeUtf8`/`Utf8View`; counts any integer or
/// float type; `date` may be text, `Date32`, `Date64` or a timestamp.
/// Works with files written by both **Pandas** and **Polars**.
fn parquet_table(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut table = RawTable::default();

    for batch_result in reader {
        let batch = batch_result?;
        if table.columns.is_empty() {
            table.columns = batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().trim().to_string())
                .collect();
        }

        let columns: Vec<Vec<Cell>> = batch
            .columns()
            .iter()
            .map(column_cells)
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            table
                .rows
                .push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    Ok(table)
}

/// Convert one Arrow column into cells.
fn column_cells(col: &ArrayRef) -> Result<Vec<Cell>> {
    let n = col.len();
    let cells = match col.data_type() {
        // Zoned timestamps keep their UTC instant; only the zone label is dropped.
        DataType::Timestamp(unit, Some(_)) => {
            date_cells(&cast(col, &DataType::Timestamp(*unit, None))?)?
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, None) => date_cells(col)?,
        dt if dt.is_integer() => {
            let arr = cast(col, &DataType::Int64)?;
            let ints = arr.as_primitive::<Int64Type>();
            (0..n)
                .map(|i| match ints.is_null(i) {
                    true => Cell::Null,
                    false => Cell::Integer(ints.value(i)),
                })
                .collect()
        }
        dt if dt.is_floating() => {
            let arr = cast(col, &DataType::Float64)?;
            let floats = arr.as_primitive::<Float64Type>();
            (0..n)
                .map(|i| match floats.is_null(i) {
                    true => Cell::Null,
                    false => Cell::Float(floats.value(i)),
                })
                .collect()
        }
        _ => {
            let arr = cast(col, &DataType::Utf8)?;
            let strings = arr.as_string::<i32>();
            (0..n)
                .map(|i| {
                    let value = if strings.is_null(i) { "" } else { strings.value(i).trim() };
                    if value.is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(value.to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

/// Convert a date or naive timestamp column into date cells.
fn date_cells(col: &ArrayRef) -> Result<Vec<Cell>> {
    let arr = cast(col, &DataType::Date32)?;
    let dates = arr.as_primitive::<Date32Type>();
    Ok((0..dates.len())
        .map(|i| match dates.is_null(i) {
            true => Cell::Null,
            false => dates.value_as_date(i).map(Cell::Date).unwrap_or(Cell::Null),
        })
        .collect())
}
