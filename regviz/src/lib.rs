//! Multi-subject scatter/regression visualization.
//!
//! Given per-subject paired observations, `regviz` fits a per-subject
//! linear relationship, lays out each subject's regression line and raw
//! or percentile-binned points in a distinct color/marker, computes
//! group-level statistics on the fitted slopes (one-sample t-test,
//! pooled correlation with missing-data bookkeeping), and optionally
//! assembles a group-average overlay — bin-wise cross-subject means with
//! standard-error crosshairs, or a single averaged-coefficient trend.
//!
//! The core ([`regression_plot`]) is pure: it decides *what* to draw and
//! returns geometry plus statistics. [`render::render_png`] is the thin
//! plotters adapter that puts that geometry on pixels.

pub mod api;
pub mod config;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod input;
pub mod preprocess;
pub mod render;
pub mod stats;

pub use api::{regression_plot, RegressionPlot, SlopeStats};
pub use config::{MarkerSymbol, PlotConfig, DEFAULT_MARKERS, DEFAULT_PALETTE};
pub use error::RegvizError;
pub use fit::Coefficients;
pub use geometry::{GroupOverlay, LineGeometry, PointGeometry};
pub use input::{RegressionInput, SubjectSeries};
pub use preprocess::{BinErrors, BinnedSubject};
pub use render::render_png;
