use std::path::PathBuf;

use clap::Parser;

use crate::data::{Dataset, FilterSelection};

/// Command line / environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "tree-dashboard")]
#[command(about = "Interactive dashboard for tree-planting records", long_about = None)]
pub struct Config {
    /// Planting records (.csv, .json or .parquet).
    #[arg(env = "TREE_DASHBOARD_DATA", default_value = "data/merged_data.csv")]
    pub data_path: PathBuf,

    /// Seed for synthetic survivor counts on rows without recorded values.
    #[arg(long, env = "TREE_DASHBOARD_SEED", default_value_t = 0)]
    pub seed: u64,

    /// Print the statistics for the selection as JSON and exit.
    #[arg(long)]
    pub report: bool,

    /// Initial species (defaults to the first one in the data).
    #[arg(long)]
    pub species: Option<String>,

    /// Initial year (defaults to the first one in the data).
    #[arg(long)]
    pub year: Option<i32>,

    /// Initial planting system (defaults to the first one in the data).
    #[arg(long)]
    pub system: Option<String>,
}

impl Config {
    /// The starting selection: command line overrides on top of the first
    /// option of each dimension. `None` only for an empty dataset without
    /// a complete override.
    pub fn initial_selection(&self, dataset: &Dataset) -> Option<FilterSelection> {
        let first = FilterSelection::first(dataset);
        Some(FilterSelection {
            species: self
                .species
                .clone()
                .or_else(|| first.as_ref().map(|s| s.species.clone()))?,
            year: self.year.or_else(|| first.as_ref().map(|s| s.year))?,
            system: self
                .system
                .clone()
                .or_else(|| first.as_ref().map(|s| s.system.clone()))?,
        })
    }
}
