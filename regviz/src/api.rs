use tracing::{debug, info};

use crate::config::PlotConfig;
use crate::error::RegvizError;
use crate::fit::{fit_line, Coefficients};
use crate::geometry::{GroupOverlay, LineGeometry, PointGeometry};
use crate::input::{RegressionInput, SubjectSeries};
use crate::preprocess::{bin_series, center_series, nan_mean, nan_sem, percentile, BinErrors};
use crate::stats::{pooled_correlation, slope_t_test};

/// Cross-subject statistics for one call.
#[derive(Debug, Clone)]
pub struct SlopeStats {
    /// Ordered mapping from subject index to fitted coefficients; skipped
    /// subjects have no entry.
    pub coefficients: Vec<(usize, Coefficients)>,
    pub t_stat: f64,
    pub df: usize,
    pub p_value: f64,
    /// Pooled Pearson correlation over all subjects' working pairs,
    /// `None` when undefined.
    pub pooled_r: Option<f64>,
    /// True where a concatenated pair was dropped for a NaN in either
    /// coordinate; covers every pre-removal observation.
    pub missing_mask: Vec<bool>,
    pub missing_count: usize,
}

/// Everything one call produces: geometry for non-skipped subjects only,
/// the post-centering/binning series, and the group statistics.
#[derive(Debug, Clone)]
pub struct RegressionPlot {
    pub lines: Vec<LineGeometry>,
    pub points: Vec<PointGeometry>,
    pub overlay: Option<GroupOverlay>,
    /// Working series per original subject index, after centering and
    /// binning.
    pub data: Vec<SubjectSeries>,
    /// Per-subject per-bin standard errors, aligned with `data`; empty
    /// when binning is disabled.
    pub bin_errors: Vec<BinErrors>,
    pub stats: SlopeStats,
}

/// Fit a per-subject linear relationship and assemble the multi-subject
/// regression figure: one regression line and point cloud per usable
/// subject, group statistics on the fitted slopes, and optionally a
/// group-average overlay.
pub fn regression_plot(
    input: RegressionInput,
    config: &PlotConfig,
) -> Result<RegressionPlot, RegvizError> {
    let mut subjects = input.normalize()?;

    if config.center {
        for series in &mut subjects {
            center_series(series);
        }
    }

    let mut bin_errors = Vec::new();
    if config.bin_count > 0 {
        for series in &mut subjects {
            if series.is_skipped() {
                bin_errors.push(BinErrors::default());
                continue;
            }
            let binned = bin_series(series, config.bin_count);
            series.x = binned.x_mean;
            series.y = binned.y_mean;
            bin_errors.push(BinErrors {
                x_sem: binned.x_sem,
                y_sem: binned.y_sem,
            });
        }
    }

    // Per-subject fit. Geometry is held in one slot per subject and
    // compacted after the loop so skipped subjects leave no hole in the
    // returned collections.
    let mut line_slots: Vec<Option<LineGeometry>> = Vec::with_capacity(subjects.len());
    let mut point_slots: Vec<Option<PointGeometry>> = Vec::with_capacity(subjects.len());
    let mut coefficients: Vec<(usize, Coefficients)> = Vec::new();

    for (i, series) in subjects.iter().enumerate() {
        if series.is_skipped() {
            debug!("subject {i} is empty or all-missing, skipping");
            line_slots.push(None);
            point_slots.push(None);
            continue;
        }
        if series.x.len() != series.y.len() {
            return Err(RegvizError::SubjectShapeMismatch {
                subject: i,
                x_len: series.x.len(),
                y_len: series.y.len(),
            });
        }

        let coeff = fit_line(i, &series.x, &series.y)?;
        coefficients.push((i, coeff));

        line_slots.push(if config.show_lines {
            let (min_x, max_x) = finite_x_range(&series.x);
            Some(LineGeometry {
                subject: i,
                start: (min_x, coeff.intercept + coeff.slope * min_x),
                end: (max_x, coeff.intercept + coeff.slope * max_x),
                color: config.subject_color(i),
            })
        } else {
            None
        });

        point_slots.push(if config.show_points {
            Some(PointGeometry {
                subject: i,
                points: series.x.iter().copied().zip(series.y.iter().copied()).collect(),
                color: config.subject_color(i),
                marker: config.subject_marker(i),
            })
        } else {
            None
        });
    }

    let slopes: Vec<f64> = coefficients.iter().map(|(_, c)| c.slope).collect();
    let test = slope_t_test(&slopes)?;
    let pooled = pooled_correlation(&subjects);

    let overlay = if config.group_overlay {
        Some(build_overlay(config, &subjects, &coefficients))
    } else {
        None
    };

    info!(
        "pooled r = {}, t({}) = {:.3}, p = {:.4}, dropped {} missing pairs",
        pooled
            .r
            .map(|r| format!("{r:.3}"))
            .unwrap_or_else(|| "undefined".into()),
        test.df,
        test.t_stat,
        test.p_value,
        pooled.missing_count,
    );

    Ok(RegressionPlot {
        lines: line_slots.into_iter().flatten().collect(),
        points: point_slots.into_iter().flatten().collect(),
        overlay,
        data: subjects,
        bin_errors,
        stats: SlopeStats {
            coefficients,
            t_stat: test.t_stat,
            df: test.df,
            p_value: test.p_value,
            pooled_r: pooled.r,
            missing_mask: pooled.missing_mask,
            missing_count: pooled.missing_count,
        },
    })
}

fn finite_x_range(x: &[f64]) -> (f64, f64) {
    let min = x.iter().copied().filter(|v| !v.is_nan()).fold(f64::INFINITY, f64::min);
    let max = x
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn build_overlay(
    config: &PlotConfig,
    subjects: &[SubjectSeries],
    coefficients: &[(usize, Coefficients)],
) -> GroupOverlay {
    let (line_color, point_color) = config.overlay_colors();

    if config.bin_count > 0 {
        // Cross-subject mean and standard error per bin index, over the
        // subjects' per-bin means.
        let k = config.bin_count;
        let mut points = Vec::with_capacity(k);
        let mut x_sem = Vec::with_capacity(k);
        let mut y_sem = Vec::with_capacity(k);
        for j in 0..k {
            let bin_x: Vec<f64> = subjects
                .iter()
                .filter(|s| !s.is_skipped())
                .map(|s| s.x[j])
                .collect();
            let bin_y: Vec<f64> = subjects
                .iter()
                .filter(|s| !s.is_skipped())
                .map(|s| s.y[j])
                .collect();
            points.push((nan_mean(&bin_x), nan_mean(&bin_y)));
            x_sem.push(nan_sem(&bin_x));
            y_sem.push(nan_sem(&bin_y));
        }
        GroupOverlay::Binned {
            points,
            x_sem,
            y_sem,
            line_color,
            point_color,
        }
    } else {
        let n = coefficients.len() as f64;
        let averaged = Coefficients {
            intercept: coefficients.iter().map(|(_, c)| c.intercept).sum::<f64>() / n,
            slope: coefficients.iter().map(|(_, c)| c.slope).sum::<f64>() / n,
        };

        // Robust extent: 5th percentile of the per-subject minima, 95th
        // of the maxima, so one subject's range can't stretch the line.
        let mut mins = Vec::new();
        let mut maxs = Vec::new();
        for series in subjects.iter().filter(|s| !s.is_skipped()) {
            let (min_x, max_x) = finite_x_range(&series.x);
            mins.push(min_x);
            maxs.push(max_x);
        }
        mins.sort_by(|a, b| a.total_cmp(b));
        maxs.sort_by(|a, b| a.total_cmp(b));
        let x_lo = percentile(&mins, 0.05);
        let x_hi = percentile(&maxs, 0.95);

        GroupOverlay::Averaged {
            coefficients: averaged,
            start: (x_lo, averaged.intercept + averaged.slope * x_lo),
            end: (x_hi, averaged.intercept + averaged.slope * x_hi),
            color: line_color,
        }
    }
}
