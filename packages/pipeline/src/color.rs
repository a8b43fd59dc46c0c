//! Sequential color palettes and equal-interval binning for the
//! choropleth.

/// Nine-class `ColorBrewer` sequential ramps, light to dark.
const PALETTES: &[(&str, [&str; 9])] = &[
    (
        "YlGnBu",
        [
            "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494",
            "#081d58",
        ],
    ),
    (
        "YlOrRd",
        [
            "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
            "#800026",
        ],
    ),
    (
        "Blues",
        [
            "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
            "#08306b",
        ],
    ),
    (
        "Greens",
        [
            "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
            "#00441b",
        ],
    ),
    (
        "PuRd",
        [
            "#f7f4f9", "#e7e1ef", "#d4b9da", "#c994c7", "#df65b0", "#e7298a", "#ce1256", "#980043",
            "#67001f",
        ],
    ),
];

/// Names of the supported palettes.
#[must_use]
pub fn palette_names() -> Vec<&'static str> {
    PALETTES.iter().map(|(name, _)| *name).collect()
}

/// Returns `bins` colors evenly spaced along the named ramp, or `None` for
/// an unknown palette or a bin count outside 2-9.
#[must_use]
pub fn palette_colors(name: &str, bins: usize) -> Option<Vec<String>> {
    if !(2..=9).contains(&bins) {
        return None;
    }
    let (_, ramp) = PALETTES.iter().find(|(n, _)| n.eq_ignore_ascii_case(name))?;
    let last = ramp.len() - 1;

    Some(
        (0..bins)
            .map(|i| ramp[(i * last + (bins - 1) / 2) / (bins - 1)].to_string())
            .collect(),
    )
}

/// Maps counts to colors using equal-width bins over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    min: u64,
    max: u64,
    colors: Vec<String>,
}

impl ColorScale {
    /// Creates a scale. `colors` must be non-empty.
    #[must_use]
    pub const fn new(min: u64, max: u64, colors: Vec<String>) -> Self {
        Self { min, max, colors }
    }

    /// Bin edges, ascending, one more than the number of colors.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn thresholds(&self) -> Vec<f64> {
        let bins = self.colors.len();
        let span = (self.max - self.min) as f64;
        (0..=bins)
            .map(|i| self.min as f64 + span * i as f64 / bins as f64)
            .collect()
    }

    /// Color for `value`. Values at or past `max` take the darkest color;
    /// a degenerate `min == max` scale puts everything there.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn color_for(&self, value: u64) -> &str {
        let last = self.colors.len() - 1;
        if self.max <= self.min || value >= self.max {
            return &self.colors[last];
        }
        let offset = value.saturating_sub(self.min) as f64;
        let span = (self.max - self.min) as f64;
        let index = ((offset / span) * self.colors.len() as f64).floor() as usize;
        &self.colors[index.min(last)]
    }

    /// The colors, light to dark.
    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}
