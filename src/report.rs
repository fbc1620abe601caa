use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::aggregate::{PlotBar, TimePoint};
use crate::data::{self, Dataset, FilterSelection, SummaryStats};

/// Everything the dashboard shows for one selection, in serializable form.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub selection: FilterSelection,
    pub records: usize,
    pub summary: SummaryStats,
    pub species_distribution: BTreeMap<String, u64>,
    pub time_series: Vec<TimePoint>,
    pub plots: Vec<PlotBar>,
}

impl Report {
    pub fn build(dataset: &Dataset, selection: FilterSelection) -> Self {
        let view = data::filter(dataset, &selection);
        Report {
            records: view.len(),
            summary: data::aggregate(&view),
            species_distribution: data::species_distribution(dataset),
            time_series: data::time_series(dataset, &selection.species, &selection.system),
            plots: data::plot_series(&view),
            selection,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
