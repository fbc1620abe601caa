//! Per-row survival metrics.
//!
//! Survivor counts come from a [`SurvivalSource`]. The seeded random source
//! produces synthetic placeholder numbers for datasets without survival
//! measurements; its output is NOT observed data and must not be reported as
//! such.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::{Dataset, PlantingRow, Record};

// ---------------------------------------------------------------------------
// SurvivalSource – where survivor counts come from
// ---------------------------------------------------------------------------

/// Supplies the number of surviving trees for a row.
///
/// Implementations should return a value in `0..=row.tree_count`; anything
/// larger is clamped by [`derive_metrics`].
pub trait SurvivalSource {
    fn survived(&mut self, row: &PlantingRow) -> u32;
}

impl<F> SurvivalSource for F
where
    F: FnMut(&PlantingRow) -> u32,
{
    fn survived(&mut self, row: &PlantingRow) -> u32 {
        self(row)
    }
}

/// Synthetic survivors drawn uniformly from `0..=tree_count`.
///
/// Deterministic for a given seed and row order. Placeholder data only.
pub struct SeededSurvival {
    rng: StdRng,
}

impl SeededSurvival {
    pub fn new(seed: u64) -> Self {
        SeededSurvival {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SurvivalSource for SeededSurvival {
    fn survived(&mut self, row: &PlantingRow) -> u32 {
        self.rng.gen_range(0..=row.tree_count)
    }
}

/// Uses the survivor count recorded in the source file, falling back to
/// another source for rows without one.
pub struct RecordedSurvival<S> {
    fallback: S,
}

impl<S: SurvivalSource> RecordedSurvival<S> {
    pub fn new(fallback: S) -> Self {
        RecordedSurvival { fallback }
    }
}

impl<S: SurvivalSource> SurvivalSource for RecordedSurvival<S> {
    fn survived(&mut self, row: &PlantingRow) -> u32 {
        match row.recorded_survived {
            Some(n) => n,
            None => self.fallback.survived(row),
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Percentage of `tree_count` that survived; `None` when nothing was planted.
pub fn survival_rate(survived_count: u32, tree_count: u32) -> Option<f64> {
    (tree_count > 0).then(|| survived_count as f64 / tree_count as f64 * 100.0)
}

/// Attach `survived_count` and `survival_rate` to every row.
pub fn derive_metrics<S: SurvivalSource>(rows: Vec<PlantingRow>, source: &mut S) -> Dataset {
    let records = rows
        .into_iter()
        .map(|row| {
            let drawn = source.survived(&row);
            let survived_count = if drawn > row.tree_count {
                log::warn!(
                    "plot {} on {}: {drawn} survivors exceeds {} planted, clamping",
                    row.plot_id,
                    row.date,
                    row.tree_count
                );
                row.tree_count
            } else {
                drawn
            };

            Record {
                survival_rate: survival_rate(survived_count, row.tree_count),
                plot_id: row.plot_id,
                species: row.species,
                system: row.system,
                date: row.date,
                year: row.year,
                tree_count: row.tree_count,
                survived_count,
            }
        })
        .collect();

    Dataset::from_records(records)
}
