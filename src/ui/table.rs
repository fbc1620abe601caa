use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};
use tree_dashboard::data::aggregate::fmt_mean;

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable table of the records in the current view.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.view() else { return };
    let records: Vec<_> = view.records().collect();

    TableBuilder::new(ui)
        .id_salt("records_table")
        .striped(true)
        .max_scroll_height(240.0)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(90.0))
        .columns(Column::remainder(), 3)
        .header(20.0, |mut header| {
            for title in ["plot_id", "date", "tree_count", "survived_count", "survival_rate"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let rec = records[row.index()];
                row.col(|ui| {
                    ui.label(&rec.plot_id);
                });
                row.col(|ui| {
                    ui.label(rec.date.to_string());
                });
                row.col(|ui| {
                    ui.label(rec.tree_count.to_string());
                });
                row.col(|ui| {
                    ui.label(rec.survived_count.to_string());
                });
                row.col(|ui| {
                    ui.label(fmt_mean(rec.survival_rate, "%"));
                });
            });
        });
}
