mod app;
mod color;
mod state;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;

use app::TreeDashboardApp;
use state::AppState;
use tree_dashboard::config::Config;
use tree_dashboard::data;
use tree_dashboard::report::Report;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    if config.report {
        return print_report(&config);
    }

    // A failed load still opens the window so another file can be picked.
    let mut state = AppState::new(config.seed);
    state.load_path(&config.data_path, |dataset| config.initial_selection(dataset));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tree Planting Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(TreeDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}

fn print_report(config: &Config) -> anyhow::Result<()> {
    let dataset = data::load_dataset(&config.data_path, config.seed)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    let selection = config
        .initial_selection(&dataset)
        .context("dataset has no records to select from")?;
    let report = Report::build(&dataset, selection);
    println!("{}", report.to_json().context("serializing report")?);
    Ok(())
}
