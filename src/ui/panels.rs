use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, Ui};
use tree_dashboard::data::aggregate::fmt_mean;
use tree_dashboard::data::FilterSelection;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter dropdowns
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if let Some(notice) = state.filter_notice() {
        ui.label(notice);
        return;
    }
    let (Some(dataset), Some(selection)) = (&state.dataset, &state.selection) else {
        return;
    };

    // Clone what we need so we can mutate state after the widgets.
    let species: Vec<String> = dataset.species().iter().cloned().collect();
    let years: Vec<i32> = dataset.years().iter().copied().collect();
    let systems: Vec<String> = dataset.systems().iter().cloned().collect();
    let current = selection.clone();

    if let Some(choice) = dropdown(ui, "Select Species", &species, &current.species) {
        state.set_species(&choice);
    }
    ui.add_space(6.0);
    if let Some(choice) = dropdown(ui, "Select Year", &years, &current.year) {
        state.set_year(choice);
    }
    ui.add_space(6.0);
    if let Some(choice) = dropdown(ui, "Select System", &systems, &current.system) {
        state.set_system(&choice);
    }

    ui.separator();
    ui.label(format!("{} matching records", state.visible_indices.len()));
}

/// A labelled combo box; returns the newly picked option, if any.
fn dropdown<T>(ui: &mut Ui, label: &str, options: &[T], current: &T) -> Option<T>
where
    T: Display + PartialEq + Clone,
{
    let mut picked = None;
    ui.strong(label);
    egui::ComboBox::from_id_salt(label)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui
                    .selectable_label(option == current, option.to_string())
                    .clicked()
                    && option != current
                {
                    picked = Some(option.clone());
                }
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Summary statistics block
// ---------------------------------------------------------------------------

pub fn summary_block(ui: &mut Ui, state: &AppState) {
    ui.heading("Summary Statistics");
    let s = &state.summary;
    egui::Grid::new("summary_stats")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            let rows = [
                ("Total Trees", s.total_trees.to_string()),
                ("Average Trees per Plot", fmt_mean(s.avg_trees_per_plot, "")),
                ("Number of Plots", s.num_plots.to_string()),
                ("Total Survived Trees", s.total_survived_trees.to_string()),
                ("Average Survival Rate", fmt_mean(s.avg_survival_rate, "%")),
            ];
            for (name, value) in rows {
                ui.label(name);
                ui.strong(value);
                ui.end_row();
            }
        });
    ui.label(
        RichText::new("Survivor counts not present in the source are synthetic placeholders.")
            .small()
            .weak(),
    );
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(path)) = (&state.dataset, &state.source_path) {
            ui.label(format!("{}: {} records", path.display(), ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open planting records")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path, FilterSelection::first);
    }
}
