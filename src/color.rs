use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette generator
// ---------------------------------------------------------------------------

/// Generates `n` soft, visually distinct colours using evenly spaced hues.
pub fn pastel_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.55, 0.75);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Species colours: species name → Color32
// ---------------------------------------------------------------------------

/// Maps each species to a pastel colour, stable for a given species list.
#[derive(Debug, Clone, Default)]
pub struct SpeciesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SpeciesColors {
    pub fn new<'a>(species: impl ExactSizeIterator<Item = &'a String>) -> Self {
        let palette = pastel_palette(species.len());
        SpeciesColors {
            mapping: species.cloned().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, species: &str) -> Color32 {
        self.mapping.get(species).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales: value → Color32
// ---------------------------------------------------------------------------

/// A piecewise-linear colour gradient, interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<LinSrgb>,
}

impl ColorScale {
    fn from_stops(stops: &[(u8, u8, u8)]) -> Self {
        ColorScale {
            stops: stops
                .iter()
                .map(|&(r, g, b)| Srgb::<u8>::new(r, g, b).into_format::<f32>().into_linear())
                .collect(),
        }
    }

    /// Dark purple → teal → yellow.
    pub fn viridis() -> Self {
        Self::from_stops(&[
            (68, 1, 84),
            (59, 82, 139),
            (33, 145, 140),
            (94, 201, 98),
            (253, 231, 37),
        ])
    }

    /// Blue → red.
    pub fn blue_red() -> Self {
        Self::from_stops(&[(0, 0, 255), (255, 0, 0)])
    }

    /// Colour at `t` in `[0, 1]` (clamped).
    pub fn at(&self, t: f64) -> Color32 {
        let Some(&last) = self.stops.last() else {
            return Color32::GRAY;
        };
        let segments = self.stops.len() - 1;
        if segments == 0 {
            return to_color32(last.into_color());
        }

        let pos = t.clamp(0.0, 1.0) as f32 * segments as f32;
        let idx = (pos.floor() as usize).min(segments - 1);
        let mixed = self.stops[idx].mix(self.stops[idx + 1], pos - idx as f32);
        to_color32(mixed.into_color())
    }

    /// Colour for `value` within `[min, max]`; the middle when the range is empty.
    pub fn map(&self, value: f64, min: f64, max: f64) -> Color32 {
        let range = max - min;
        if range.abs() < f64::EPSILON {
            self.at(0.5)
        } else {
            self.at((value - min) / range)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_endpoints_hit_the_stops() {
        let scale = ColorScale::blue_red();
        assert_eq!(scale.at(0.0), Color32::from_rgb(0, 0, 255));
        assert_eq!(scale.at(1.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(scale.at(7.0), scale.at(1.0));
        assert_eq!(scale.map(3.0, 3.0, 3.0), scale.at(0.5));
    }

    #[test]
    fn species_colors_are_distinct() {
        let species: Vec<String> = vec!["Oak".into(), "Pine".into(), "Teak".into()];
        let colors = SpeciesColors::new(species.iter());
        assert_ne!(colors.color_for("Oak"), colors.color_for("Pine"));
        assert_eq!(colors.color_for("Birch"), Color32::GRAY);
    }
}
