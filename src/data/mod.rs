/// Data layer: loading, survival metrics, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<PlantingRow>   (SchemaError / ParseError)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  metrics  │  SurvivalSource → survived_count, survival_rate
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, species / year / system options
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌───────────┐
///   │  filter   │ ───▶ │ aggregate │  SummaryStats, distribution, series
///   └──────────┘      └───────────┘
/// ```
use std::path::Path;

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;

pub use aggregate::{aggregate, plot_series, species_distribution, time_series, SummaryStats};
pub use error::LoadError;
pub use filter::{filter, FilterSelection, FilteredView};
pub use metrics::{RecordedSurvival, SeededSurvival, SurvivalSource};
pub use model::{Dataset, PlantingRow, Record};

/// Load a file and derive survival metrics in one step.
///
/// Recorded `survived_count` values are used where present; other rows get
/// synthetic survivors from a generator seeded with `seed`.
pub fn load_dataset(path: &Path, seed: u64) -> Result<Dataset, LoadError> {
    let rows = loader::load_file(path)?;
    let recorded = rows.iter().filter(|r| r.recorded_survived.is_some()).count();
    if recorded < rows.len() {
        log::info!(
            "{} of {} rows have no recorded survivors; using synthetic placeholder values (seed {seed})",
            rows.len() - recorded,
            rows.len()
        );
    }
    let mut source = RecordedSurvival::new(SeededSurvival::new(seed));
    Ok(metrics::derive_metrics(rows, &mut source))
}
