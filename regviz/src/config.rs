use plotters::style::RGBColor;

/// Built-in subject palette, tiled when there are more subjects than
/// colors. The first two entries double as the default group-overlay
/// line and point colors.
pub const DEFAULT_PALETTE: [RGBColor; 9] = [
    RGBColor(0, 119, 182),   // Blue
    RGBColor(217, 72, 1),    // Orange
    RGBColor(0, 153, 136),   // Teal
    RGBColor(153, 0, 153),   // Purple
    RGBColor(230, 159, 0),   // Yellow
    RGBColor(86, 180, 233),  // Sky Blue
    RGBColor(213, 94, 0),    // Vermillion
    RGBColor(0, 158, 115),   // Bluish Green
    RGBColor(204, 121, 167), // Reddish Purple
];

/// Marker shape for one subject's point cloud. Cycled by subject
/// position modulo the marker set length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSymbol {
    Circle,
    Square,
    Diamond,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Cross,
}

pub const DEFAULT_MARKERS: [MarkerSymbol; 8] = [
    MarkerSymbol::Circle,
    MarkerSymbol::Square,
    MarkerSymbol::Diamond,
    MarkerSymbol::TriangleUp,
    MarkerSymbol::TriangleDown,
    MarkerSymbol::TriangleLeft,
    MarkerSymbol::TriangleRight,
    MarkerSymbol::Cross,
];

/// Options for [`regression_plot`](crate::regression_plot). Every
/// recognized option lives here with its default; there is no free-form
/// key scanning.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Number of percentile bins per subject; 0 disables binning.
    pub bin_count: usize,
    /// Subtract each subject's own mean from its X and Y before
    /// binning/fitting.
    pub center: bool,
    /// Per-subject line/point colors; `None` uses the built-in palette.
    pub colors: Option<Vec<RGBColor>>,
    /// Group-overlay (line, point) colors; `None` takes the first two
    /// subject colors.
    pub group_colors: Option<(RGBColor, RGBColor)>,
    /// Per-subject point markers; `None` uses the built-in 8-symbol set.
    pub marker_symbols: Option<Vec<MarkerSymbol>>,
    /// Emit per-subject point clouds.
    pub show_points: bool,
    /// Emit per-subject regression lines.
    pub show_lines: bool,
    /// Emit the group-average overlay (binned crosshairs when
    /// `bin_count > 0`, otherwise one averaged-coefficient line).
    pub group_overlay: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            bin_count: 0,
            center: false,
            colors: None,
            group_colors: None,
            marker_symbols: None,
            show_points: true,
            show_lines: true,
            group_overlay: false,
        }
    }
}

impl PlotConfig {
    /// Color for subject `i`, cycling through the configured or built-in
    /// palette.
    pub fn subject_color(&self, i: usize) -> RGBColor {
        match &self.colors {
            Some(colors) if !colors.is_empty() => colors[i % colors.len()],
            _ => DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()],
        }
    }

    /// Marker for subject `i`, cycling through the configured or built-in
    /// symbol set.
    pub fn subject_marker(&self, i: usize) -> MarkerSymbol {
        match &self.marker_symbols {
            Some(markers) if !markers.is_empty() => markers[i % markers.len()],
            _ => DEFAULT_MARKERS[i % DEFAULT_MARKERS.len()],
        }
    }

    /// Group-overlay (line, point) colors.
    pub fn overlay_colors(&self) -> (RGBColor, RGBColor) {
        self.group_colors
            .unwrap_or_else(|| (self.subject_color(0), self.subject_color(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_and_markers_cycle() {
        let config = PlotConfig::default();
        assert_eq!(config.subject_color(0), config.subject_color(DEFAULT_PALETTE.len()));
        assert_eq!(config.subject_marker(3), config.subject_marker(11));
        assert_eq!(config.subject_marker(0), MarkerSymbol::Circle);
    }

    #[test]
    fn custom_palette_is_tiled() {
        let config = PlotConfig {
            colors: Some(vec![RGBColor(1, 2, 3), RGBColor(4, 5, 6)]),
            ..Default::default()
        };
        assert_eq!(config.subject_color(0), RGBColor(1, 2, 3));
        assert_eq!(config.subject_color(5), RGBColor(4, 5, 6));
    }

    #[test]
    fn overlay_colors_default_to_first_two() {
        let config = PlotConfig::default();
        assert_eq!(config.overlay_colors(), (DEFAULT_PALETTE[0], DEFAULT_PALETTE[1]));
    }
}
