use crate::input::SubjectSeries;

/// Mean over the non-NaN entries; NaN when there are none.
pub(crate) fn nan_mean(vals: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in vals {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (ddof 1) over the non-NaN entries. A single
/// value has deviation 0; no values give NaN.
pub(crate) fn nan_std(vals: &[f64]) -> f64 {
    let finite: Vec<f64> = vals.iter().copied().filter(|v| !v.is_nan()).collect();
    match finite.len() {
        0 => f64::NAN,
        1 => 0.0,
        n => {
            let mean = finite.iter().sum::<f64>() / n as f64;
            let ss = finite.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
            (ss / (n - 1) as f64).sqrt()
        }
    }
}

/// Standard error of the mean over the non-NaN entries.
pub(crate) fn nan_sem(vals: &[f64]) -> f64 {
    let count = vals.iter().filter(|v| !v.is_nan()).count();
    if count == 0 {
        f64::NAN
    } else {
        nan_std(vals) / (count as f64).sqrt()
    }
}

/// Percentile of a sorted slice with linear interpolation between ranks,
/// `p` in [0, 1].
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (sorted.len() as f64 - 1.0) * p;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx + 1 < sorted.len() {
        sorted[idx] * (1.0 - frac) + sorted[idx + 1] * frac
    } else {
        sorted[idx]
    }
}

/// Subtract the subject's own mean from every element, per coordinate.
pub fn center_series(series: &mut SubjectSeries) {
    let mean_x = nan_mean(&series.x);
    let mean_y = nan_mean(&series.y);
    if !mean_x.is_nan() {
        for v in &mut series.x {
            *v -= mean_x;
        }
    }
    if !mean_y.is_nan() {
        for v in &mut series.y {
            *v -= mean_y;
        }
    }
}

/// One subject collapsed into percentile bins: per-bin means and standard
/// errors, in bin order.
#[derive(Debug, Clone, Default)]
pub struct BinnedSubject {
    pub x_mean: Vec<f64>,
    pub y_mean: Vec<f64>,
    pub x_sem: Vec<f64>,
    pub y_sem: Vec<f64>,
}

/// Per-bin standard errors retained alongside the transformed series in
/// the output bundle.
#[derive(Debug, Clone, Default)]
pub struct BinErrors {
    pub x_sem: Vec<f64>,
    pub y_sem: Vec<f64>,
}

/// Collapse a subject into `k` equal-population bins. Boundaries are the
/// X percentiles at 0, 100/k, ..., 100 with the final boundary replaced
/// by +inf so the last bin includes the maximum; assignment is half-open
/// `[b_j, b_{j+1})`. Points with NaN X fall in no bin; NaN Y values are
/// ignored by the per-bin aggregates.
pub fn bin_series(series: &SubjectSeries, k: usize) -> BinnedSubject {
    let mut sorted_x: Vec<f64> = series.x.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted_x.sort_by(|a, b| a.total_cmp(b));

    let mut bounds: Vec<f64> = (0..=k)
        .map(|i| percentile(&sorted_x, i as f64 / k as f64))
        .collect();
    if let Some(last) = bounds.last_mut() {
        *last = f64::INFINITY;
    }

    let mut binned = BinnedSubject::default();
    for j in 0..k {
        let (lo, hi) = (bounds[j], bounds[j + 1]);
        let mut bin_x = Vec::new();
        let mut bin_y = Vec::new();
        for (&xv, &yv) in series.x.iter().zip(&series.y) {
            if xv >= lo && xv < hi {
                bin_x.push(xv);
                bin_y.push(yv);
            }
        }
        binned.x_mean.push(nan_mean(&bin_x));
        binned.y_mean.push(nan_mean(&bin_y));
        binned.x_sem.push(nan_sem(&bin_x));
        binned.y_sem.push(nan_sem(&bin_y));
    }
    binned
}
