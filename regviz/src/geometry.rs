use plotters::style::RGBColor;

use crate::config::MarkerSymbol;
use crate::fit::Coefficients;

/// One subject's fitted regression line, spanning its X range.
#[derive(Debug, Clone)]
pub struct LineGeometry {
    pub subject: usize,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub color: RGBColor,
}

/// One subject's raw or binned point cloud.
#[derive(Debug, Clone)]
pub struct PointGeometry {
    pub subject: usize,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub marker: MarkerSymbol,
}

/// The group-average overlay. The mode follows the binning choice:
/// per-bin cross-subject means with standard-error crosshairs when
/// binning was requested, otherwise one averaged-coefficient segment
/// clipped to the robust 5th/95th-percentile X extent.
#[derive(Debug, Clone)]
pub enum GroupOverlay {
    Binned {
        points: Vec<(f64, f64)>,
        x_sem: Vec<f64>,
        y_sem: Vec<f64>,
        line_color: RGBColor,
        point_color: RGBColor,
    },
    Averaged {
        coefficients: Coefficients,
        start: (f64, f64),
        end: (f64, f64),
        color: RGBColor,
    },
}
