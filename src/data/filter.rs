use serde::Serialize;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: one selected value per dimension
// ---------------------------------------------------------------------------

/// The dropdown selection: one species, one year, one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub species: String,
    pub year: i32,
    pub system: String,
}

impl FilterSelection {
    pub fn new(species: impl Into<String>, year: i32, system: impl Into<String>) -> Self {
        FilterSelection {
            species: species.into(),
            year,
            system: system.into(),
        }
    }

    /// The first option of every dimension, or `None` for an empty dataset.
    pub fn first(dataset: &Dataset) -> Option<Self> {
        Some(FilterSelection {
            species: dataset.species().first()?.clone(),
            year: *dataset.years().first()?,
            system: dataset.systems().first()?.clone(),
        })
    }

    /// Exact, case-sensitive match on all three dimensions.
    pub fn matches(&self, record: &Record) -> bool {
        record.species == self.species && record.year == self.year && record.system == self.system
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the records passing a selection
// ---------------------------------------------------------------------------

/// A read-only subset of a [`Dataset`], kept as row indices in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    /// Rebuild a view from indices cached by a previous [`filter`] call.
    /// Indices past the end of the dataset are dropped.
    pub fn from_indices(dataset: &'a Dataset, indices: &[usize]) -> Self {
        let indices = indices
            .iter()
            .copied()
            .filter(|&i| i < dataset.len())
            .collect();
        FilteredView { dataset, indices }
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the records matching `selection` on species, year and system.
///
/// An empty view is a normal result, not an error.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView::new(dataset, indices)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(plot_id: &str, species: &str, date: (i32, u32, u32), system: &str) -> Record {
        Record {
            plot_id: plot_id.into(),
            species: species.into(),
            system: system.into(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            year: date.0,
            tree_count: 5,
            survived_count: 2,
            survival_rate: Some(40.0),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("1", "Oak", (2020, 1, 1), "A"),
            record("2", "Oak", (2021, 1, 1), "A"),
            record("3", "oak", (2021, 1, 1), "A"),
            record("4", "Oak", (2021, 6, 1), "B"),
            record("5", "Oak", (2021, 9, 1), "A"),
        ])
    }

    #[test]
    fn all_three_dimensions_must_match() {
        let ds = dataset();
        let view = filter(&ds, &FilterSelection::new("Oak", 2021, "A"));
        let ids: Vec<_> = view.records().map(|r| r.plot_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "5"]);
    }

    #[test]
    fn no_match_gives_empty_view() {
        let ds = dataset();
        let view = filter(&ds, &FilterSelection::new("Pine", 2021, "A"));
        assert!(view.is_empty());
        assert_eq!(view.records().count(), 0);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset();
        let sel = FilterSelection::new("Oak", 2021, "A");
        assert_eq!(filter(&ds, &sel).indices(), filter(&ds, &sel).indices());
    }

    #[test]
    fn first_selection_uses_first_options() {
        let ds = dataset();
        assert_eq!(
            FilterSelection::first(&ds),
            Some(FilterSelection::new("Oak", 2020, "A"))
        );
        assert_eq!(FilterSelection::first(&Dataset::default()), None);
    }

    #[test]
    fn stale_indices_are_dropped() {
        let ds = dataset();
        let view = FilteredView::from_indices(&ds, &[0, 4, 99]);
        assert_eq!(view.indices(), &[0, 4]);
    }
}
