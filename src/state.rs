use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tree_dashboard::data::aggregate::{PlotBar, TimePoint};
use tree_dashboard::data::{self, Dataset, FilterSelection, FilteredView, SummaryStats};

use crate::color::SpeciesColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Everything derived from the selection is cached here and rebuilt by
/// [`AppState::refilter`] whenever a dropdown changes.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Dataset>,

    /// File the dataset came from.
    pub source_path: Option<PathBuf>,

    /// Seed for synthetic survivor counts.
    pub seed: u64,

    /// Current dropdown selection.
    pub selection: Option<FilterSelection>,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    pub summary: SummaryStats,
    pub plots: Vec<PlotBar>,
    pub time_series: Vec<TimePoint>,

    /// Tree totals per species over the whole dataset; independent of selection.
    pub species_totals: BTreeMap<String, u64>,
    pub species_colors: SpeciesColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(seed: u64) -> Self {
        AppState {
            seed,
            ..Default::default()
        }
    }

    /// Load `path`, keeping the current dataset if loading fails.
    ///
    /// `choose` picks the initial selection from the freshly loaded dataset.
    pub fn load_path<F>(&mut self, path: &Path, choose: F)
    where
        F: FnOnce(&Dataset) -> Option<FilterSelection>,
    {
        match data::load_dataset(path, self.seed) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records from {} ({} species, {} years, {} systems)",
                    dataset.len(),
                    path.display(),
                    dataset.species().len(),
                    dataset.years().len(),
                    dataset.systems().len()
                );
                let selection = choose(&dataset);
                self.source_path = Some(path.to_path_buf());
                self.set_dataset(dataset, selection);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error loading {}: {e}", path.display()));
            }
        }
    }

    /// Ingest a newly loaded dataset and compute everything for the
    /// preferred selection, or the first options when there is none.
    pub fn set_dataset(&mut self, dataset: Dataset, preferred: Option<FilterSelection>) {
        self.species_totals = data::species_distribution(&dataset);
        self.species_colors = SpeciesColors::new(dataset.species().iter());
        self.selection = preferred.or_else(|| FilterSelection::first(&dataset));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Current filtered view, rebuilt from the cached indices.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        let ds = self.dataset.as_ref()?;
        Some(FilteredView::from_indices(ds, &self.visible_indices))
    }

    /// Recompute the view and every aggregate after a selection change.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(sel)) = (&self.dataset, &self.selection) else {
            self.visible_indices.clear();
            self.summary = SummaryStats::default();
            self.plots.clear();
            self.time_series.clear();
            return;
        };

        let view = data::filter(ds, sel);
        log::debug!(
            "{} / {} / {}: {} of {} records",
            sel.species,
            sel.year,
            sel.system,
            view.len(),
            ds.len()
        );
        self.summary = data::aggregate(&view);
        self.plots = data::plot_series(&view);
        self.time_series = data::time_series(ds, &sel.species, &sel.system);
        self.visible_indices = view.into_indices();
    }

    /// Why the filter dropdowns cannot be shown, if they cannot.
    pub fn filter_notice(&self) -> Option<&'static str> {
        match (&self.dataset, &self.selection) {
            (None, _) => Some("No dataset loaded."),
            (Some(ds), sel) if ds.is_empty() || sel.is_none() => Some("Dataset has no records."),
            (Some(_), _) => None,
        }
    }

    pub fn set_species(&mut self, species: &str) {
        if let Some(sel) = &mut self.selection {
            sel.species = species.to_string();
            self.refilter();
        }
    }

    pub fn set_year(&mut self, year: i32) {
        if let Some(sel) = &mut self.selection {
            sel.year = year;
            self.refilter();
        }
    }

    pub fn set_system(&mut self, system: &str) {
        if let Some(sel) = &mut self.selection {
            sel.system = system.to_string();
            self.refilter();
        }
    }
}
