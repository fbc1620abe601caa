use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::ColorScale;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;
const PIE_SEGMENTS_PER_TURN: f64 = 180.0;
const SERIES_COLOR: Color32 = Color32::from_rgb(0xFF, 0x57, 0x33);

// ---------------------------------------------------------------------------
// Per-plot bar charts
// ---------------------------------------------------------------------------

/// Tree count for each plot of the current selection.
pub fn tree_count_chart(ui: &mut Ui, state: &AppState) {
    let Some(sel) = &state.selection else { return };
    ui.strong(format!(
        "Tree Count for {} in {} ({})",
        sel.species, sel.year, sel.system
    ));

    let values: Vec<Option<f64>> = state.plots.iter().map(|b| Some(b.tree_count as f64)).collect();
    plot_bars(ui, "tree_count_chart", "tree_count", state, &values, &ColorScale::viridis());
}

/// Mean survival rate for each plot of the current selection. Plots without
/// a defined rate get no bar.
pub fn survival_rate_chart(ui: &mut Ui, state: &AppState) {
    let Some(sel) = &state.selection else { return };
    ui.strong(format!(
        "Survival Rate by Plot for {} in {} ({})",
        sel.species, sel.year, sel.system
    ));

    let values: Vec<Option<f64>> = state.plots.iter().map(|b| b.survival_rate).collect();
    plot_bars(ui, "survival_rate_chart", "survival_rate", state, &values, &ColorScale::blue_red());
}

fn plot_bars(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    state: &AppState,
    values: &[Option<f64>],
    scale: &ColorScale,
) {
    if state.plots.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }

    let defined = values.iter().flatten().copied();
    let min = defined.clone().fold(f64::INFINITY, f64::min);
    let max = defined.fold(f64::NEG_INFINITY, f64::max);

    let bars: Vec<Bar> = state
        .plots
        .iter()
        .zip(values)
        .enumerate()
        .filter_map(|(i, (plot, value))| {
            let value = (*value)?;
            Some(
                Bar::new(i as f64, value)
                    .name(&plot.plot_id)
                    .fill(scale.map(value, min, max))
                    .width(0.7),
            )
        })
        .collect();

    let labels: Vec<String> = state.plots.iter().map(|p| p.plot_id.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("plot_id")
        .y_axis_label(y_label)
        .include_y(0.0)
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(y_label));
        });
}

/// Category name for an integral axis position, empty between categories.
fn category_label(labels: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Species distribution pie
// ---------------------------------------------------------------------------

/// Share of all planted trees per species, independent of the selection.
pub fn species_pie(ui: &mut Ui, state: &AppState) {
    ui.strong("Species Distribution");

    let total: u64 = state.species_totals.values().sum();
    if total == 0 {
        ui.label("No trees recorded.");
        return;
    }

    Plot::new("species_pie")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for (species, &count) in &state.species_totals {
                let sweep = count as f64 / total as f64 * TAU;
                if sweep > 0.0 {
                    let share = count as f64 / total as f64 * 100.0;
                    plot_ui.polygon(
                        Polygon::new(pie_slice(start, sweep))
                            .name(format!("{species} ({share:.1}%)"))
                            .fill_color(state.species_colors.color_for(species)),
                    );
                }
                start += sweep;
            }
        });
}

/// Unit-circle wedge starting at 12 o'clock, going clockwise.
fn pie_slice(start: f64, sweep: f64) -> PlotPoints<'static> {
    let steps = ((sweep / TAU) * PIE_SEGMENTS_PER_TURN).ceil().max(1.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=steps).map(|k| {
        let angle = start + sweep * k as f64 / steps as f64;
        [angle.sin(), angle.cos()]
    }));
    PlotPoints::new(points)
}

// ---------------------------------------------------------------------------
// Tree count over time
// ---------------------------------------------------------------------------

/// Tree counts by date for the selected species and system, any year.
pub fn time_series_chart(ui: &mut Ui, state: &AppState) {
    let Some(sel) = &state.selection else { return };
    ui.strong(format!(
        "Tree Count Over Time for {} ({})",
        sel.species, sel.system
    ));

    if state.time_series.is_empty() {
        ui.label("No records for this species and system.");
        return;
    }

    let coords: Vec<[f64; 2]> = state
        .time_series
        .iter()
        .map(|p| [p.date.num_days_from_ce() as f64, p.tree_count as f64])
        .collect();

    Plot::new("time_series_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("date")
        .y_axis_label("tree_count")
        .x_axis_formatter(|mark: GridMark, _range| day_label(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(coords.clone()))
                    .color(SERIES_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(coords))
                    .color(SERIES_COLOR)
                    .radius(3.5),
            );
        });
}

fn day_label(days_from_ce: f64) -> String {
    if days_from_ce.fract() != 0.0 || days_from_ce.abs() > i32::MAX as f64 {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(days_from_ce as i32)
        .map(|d| d.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_whole_positions() {
        let labels = vec!["P1".to_string(), "P2".to_string()];
        assert_eq!(category_label(&labels, 1.0), "P2");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 5.0), "");
    }

    #[test]
    fn day_labels_round_trip_dates() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(day_label(date.num_days_from_ce() as f64), "2021-03-04");
        assert_eq!(day_label(0.25), "");
    }

    #[test]
    fn pie_slice_closes_at_the_centre() {
        let points = pie_slice(0.0, TAU / 4.0).points().to_vec();
        assert_eq!(points.first().map(|p| (p.x, p.y)), Some((0.0, 0.0)));
        let last = points.last().unwrap();
        assert!((last.x - 1.0).abs() < 1e-9 && last.y.abs() < 1e-9);
    }
}
