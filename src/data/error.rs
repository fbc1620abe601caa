//! Errors raised while loading a planting dataset.

use chrono::NaiveDate;
use thiserror::Error;

/// Failure to turn a source file into planting rows.
///
/// `Schema`, `Parse` and `YearMismatch` are fatal at load time and carry
/// enough context to point the user at the offending column or row.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// The source is structurally wrong, e.g. JSON that is not a list of objects.
    #[error("Malformed source: {0}")]
    Malformed(String),

    /// One or more required columns are absent.
    #[error("Missing required column(s): {}", .missing.join(", "))]
    Schema {
        /// Every missing column, in schema order.
        missing: Vec<String>,
    },

    /// A cell could not be interpreted.
    #[error("Row {row}{}: column '{column}' has invalid value '{value}' ({reason})", plot_suffix(.plot_id))]
    Parse {
        /// 1-based data row (the header is not counted).
        row: usize,
        plot_id: Option<String>,
        column: String,
        value: String,
        reason: String,
    },

    /// A supplied `year` does not agree with `date`.
    #[error("Row {row}: year {year} does not match date {date}")]
    YearMismatch {
        row: usize,
        year: i32,
        date: NaiveDate,
    },
}

fn plot_suffix(plot_id: &Option<String>) -> String {
    match plot_id {
        Some(id) => format!(" (plot {id})"),
        None => String::new(),
    }
}

/// Result type alias for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
