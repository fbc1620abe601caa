use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilteredView;
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// SummaryStats – the five scalars shown under the charts
// ---------------------------------------------------------------------------

/// Scalar aggregates over a view. Means are `None` when undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_trees: u64,
    pub avg_trees_per_plot: Option<f64>,
    pub num_plots: usize,
    pub total_survived_trees: u64,
    /// Mean over records with a defined survival rate only.
    pub avg_survival_rate: Option<f64>,
}

impl SummaryStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut rows = 0usize;
        let mut total_trees = 0u64;
        let mut total_survived_trees = 0u64;
        let mut rate_sum = 0.0;
        let mut rate_rows = 0usize;
        let mut plots: HashSet<&str> = HashSet::new();

        for rec in records {
            rows += 1;
            total_trees += u64::from(rec.tree_count);
            total_survived_trees += u64::from(rec.survived_count);
            plots.insert(rec.plot_id.as_str());
            if let Some(rate) = rec.survival_rate {
                rate_sum += rate;
                rate_rows += 1;
            }
        }

        SummaryStats {
            total_trees,
            avg_trees_per_plot: mean(total_trees as f64, rows),
            num_plots: plots.len(),
            total_survived_trees,
            avg_survival_rate: mean(rate_sum, rate_rows),
        }
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Trees: {}", self.total_trees)?;
        writeln!(
            f,
            "Average Trees per Plot: {}",
            fmt_mean(self.avg_trees_per_plot, "")
        )?;
        writeln!(f, "Number of Plots: {}", self.num_plots)?;
        writeln!(f, "Total Survived Trees: {}", self.total_survived_trees)?;
        write!(
            f,
            "Average Survival Rate: {}",
            fmt_mean(self.avg_survival_rate, "%")
        )
    }
}

/// Two decimals plus `unit`, or `undefined`.
pub fn fmt_mean(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2}{unit}"),
        None => "undefined".to_string(),
    }
}

fn mean(sum: f64, n: usize) -> Option<f64> {
    (n > 0).then(|| sum / n as f64)
}

/// Summary statistics of a view.
pub fn aggregate(view: &FilteredView<'_>) -> SummaryStats {
    SummaryStats::from_records(view.records())
}

// ---------------------------------------------------------------------------
// Species distribution (whole dataset)
// ---------------------------------------------------------------------------

/// Total `tree_count` per species across the full dataset.
pub fn species_distribution(dataset: &Dataset) -> BTreeMap<String, u64> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for rec in dataset.records() {
        *totals.entry(rec.species.clone()).or_default() += u64::from(rec.tree_count);
    }
    totals
}

// ---------------------------------------------------------------------------
// Time series (species + system, any year)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub tree_count: u32,
    pub plot_id: String,
}

/// Tree counts over time for one species and system, ignoring year.
///
/// Sorted ascending by date. Rows sharing a date stay separate points in
/// dataset order.
pub fn time_series(dataset: &Dataset, species: &str, system: &str) -> Vec<TimePoint> {
    let mut points: Vec<TimePoint> = dataset
        .records()
        .iter()
        .filter(|rec| rec.species == species && rec.system == system)
        .map(|rec| TimePoint {
            date: rec.date,
            tree_count: rec.tree_count,
            plot_id: rec.plot_id.clone(),
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

// ---------------------------------------------------------------------------
// Per-plot bars
// ---------------------------------------------------------------------------

/// One bar of the per-plot charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotBar {
    pub plot_id: String,
    pub tree_count: u64,
    /// Mean of the plot's defined survival rates.
    pub survival_rate: Option<f64>,
}

/// Group a view by `plot_id` in first-appearance order.
pub fn plot_series(view: &FilteredView<'_>) -> Vec<PlotBar> {
    let mut bars: Vec<PlotBar> = Vec::new();
    let mut rates: Vec<(f64, usize)> = Vec::new();
    let mut slot: BTreeMap<&str, usize> = BTreeMap::new();

    for rec in view.records() {
        let idx = *slot.entry(rec.plot_id.as_str()).or_insert_with(|| {
            bars.push(PlotBar {
                plot_id: rec.plot_id.clone(),
                tree_count: 0,
                survival_rate: None,
            });
            rates.push((0.0, 0));
            bars.len() - 1
        });

        bars[idx].tree_count += u64::from(rec.tree_count);
        if let Some(rate) = rec.survival_rate {
            rates[idx].0 += rate;
            rates[idx].1 += 1;
        }
    }

    for (bar, (sum, n)) in bars.iter_mut().zip(rates) {
        bar.survival_rate = mean(sum, n);
    }
    bars
}
