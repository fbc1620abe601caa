use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TreeDashboardApp {
    pub state: AppState,
}

impl TreeDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TreeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: statistics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Tree Planting Dashboard");
            ui.separator();

            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a file to explore planting records  (File → Open…)");
                });
                return;
            }

            let state = &self.state;
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    charts::tree_count_chart(ui, state);
                    ui.separator();
                    panels::summary_block(ui, state);
                    ui.separator();
                    charts::species_pie(ui, state);
                    ui.separator();
                    charts::time_series_chart(ui, state);
                    ui.separator();
                    charts::survival_rate_chart(ui, state);
                    ui.separator();
                    ui.collapsing("Records", |ui: &mut Ui| {
                        table::records_table(ui, state);
                    });
                });
        });
    }
}
