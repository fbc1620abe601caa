use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// PlantingRow – one row as read from the source file
// ---------------------------------------------------------------------------

/// A loaded row before survival metrics are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantingRow {
    pub plot_id: String,
    pub species: String,
    pub system: String,
    pub date: NaiveDate,
    /// Always equal to `date.year()`; either read or derived at load.
    pub year: i32,
    pub tree_count: u32,
    /// Survivors as recorded by the source, when it carries that column.
    pub recorded_survived: Option<u32>,
}

// ---------------------------------------------------------------------------
// Record – one row of the derived dataset
// ---------------------------------------------------------------------------

/// A planting observation with its survival metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub plot_id: String,
    pub species: String,
    pub system: String,
    pub date: NaiveDate,
    pub year: i32,
    pub tree_count: u32,
    /// Invariant: `survived_count <= tree_count`.
    pub survived_count: u32,
    /// Percentage of trees alive. `None` when `tree_count == 0`.
    pub survival_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full derived dataset with pre-computed option lists.
///
/// Built once per load and never mutated; callers own it and pass it to the
/// filter and aggregation functions explicitly.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    species: BTreeSet<String>,
    years: BTreeSet<i32>,
    systems: BTreeSet<String>,
}

impl Dataset {
    /// Build option indices from the derived records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut species = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut systems = BTreeSet::new();

        for rec in &records {
            species.insert(rec.species.clone());
            years.insert(rec.year);
            systems.insert(rec.system.clone());
        }

        Dataset {
            records,
            species,
            years,
            systems,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct species, in stable sorted order.
    pub fn species(&self) -> &BTreeSet<String> {
        &self.species
    }

    /// Distinct years, in stable sorted order.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Distinct planting systems, in stable sorted order.
    pub fn systems(&self) -> &BTreeSet<String> {
        &self.systems
    }

    /// A view over every record.
    pub fn full_view(&self) -> FilteredView<'_> {
        FilteredView::new(self, (0..self.records.len()).collect())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(species: &str, year: i32, system: &str) -> Record {
        Record {
            plot_id: "1".into(),
            species: species.into(),
            system: system.into(),
            date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            year,
            tree_count: 1,
            survived_count: 1,
            survival_rate: Some(100.0),
        }
    }

    #[test]
    fn option_lists_are_distinct_and_stable() {
        let ds = Dataset::from_records(vec![
            record("Pine", 2021, "B"),
            record("Oak", 2020, "A"),
            record("Pine", 2020, "A"),
        ]);

        let species: Vec<_> = ds.species().iter().cloned().collect();
        assert_eq!(species, vec!["Oak", "Pine"]);
        let years: Vec<_> = ds.years().iter().copied().collect();
        assert_eq!(years, vec![2020, 2021]);
        assert_eq!(ds.systems().len(), 2);

        let again: Vec<_> = ds.species().iter().cloned().collect();
        assert_eq!(species, again);
    }

    #[test]
    fn full_view_covers_every_record() {
        let ds = Dataset::from_records(vec![record("Oak", 2020, "A"), record("Oak", 2021, "A")]);
        assert_eq!(ds.full_view().len(), 2);
        assert!(Dataset::default().full_view().is_empty());
    }
}
