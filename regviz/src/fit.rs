use ndarray::{Array1, Array2};
use ndarray_linalg::Inverse;

use crate::error::RegvizError;
use crate::preprocess::nan_mean;

/// Ordinary-least-squares intercept and slope of `y ~ 1 + x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub intercept: f64,
    pub slope: f64,
}

/// Fit `y` on `[1, x]` by the normal equations `w = (X'X)^-1 X'y`.
/// Pairs with a NaN in either coordinate are dropped before fitting; the
/// caller's skip rule guarantees at least one finite pair remains.
///
/// A subject whose X values are all identical has no defined slope; the
/// fit deterministically returns `(mean(y), 0.0)` for it instead of
/// letting a singular solve poison the group statistics.
pub fn fit_line(subject: usize, x: &[f64], y: &[f64]) -> Result<Coefficients, RegvizError> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(xv, yv)| !xv.is_nan() && !yv.is_nan())
        .map(|(&xv, &yv)| (xv, yv))
        .collect();
    let n = pairs.len();
    if n == 0 {
        // all pairs had a missing half; same degenerate answer as a flat X
        return Ok(Coefficients {
            intercept: nan_mean(y),
            slope: 0.0,
        });
    }

    let min_x = pairs.iter().map(|(xv, _)| *xv).fold(f64::INFINITY, f64::min);
    let max_x = pairs
        .iter()
        .map(|(xv, _)| *xv)
        .fold(f64::NEG_INFINITY, f64::max);
    if min_x == max_x {
        let ys: Vec<f64> = pairs.iter().map(|(_, yv)| *yv).collect();
        return Ok(Coefficients {
            intercept: nan_mean(&ys),
            slope: 0.0,
        });
    }

    let mut design = Array2::<f64>::zeros((n, 2));
    let mut target = Array1::<f64>::zeros(n);
    for (i, &(xv, yv)) in pairs.iter().enumerate() {
        design[[i, 0]] = 1.0;
        design[[i, 1]] = xv;
        target[i] = yv;
    }

    let xtx = design.t().dot(&design);
    let xtx_inv = xtx.inv().map_err(|e| RegvizError::Fit {
        subject,
        reason: e.to_string(),
    })?;
    let coeffs = xtx_inv.dot(&design.t().dot(&target));

    Ok(Coefficients {
        intercept: coeffs[0],
        slope: coeffs[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn recovers_a_noiseless_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.5 * v - 1.0).collect();
        let coeff = fit_line(0, &x, &y).unwrap();
        assert_approx_eq!(coeff.slope, 2.5, 1e-9);
        assert_approx_eq!(coeff.intercept, -1.0, 1e-9);
    }

    #[test]
    fn least_squares_over_noisy_points() {
        // symmetric residuals around y = x
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.5, 0.5, 2.5, 2.5];
        let coeff = fit_line(0, &x, &y).unwrap();
        assert_approx_eq!(coeff.slope, 0.8, 1e-9);
        assert_approx_eq!(coeff.intercept, 0.3, 1e-9);
    }

    #[test]
    fn degenerate_x_gives_zero_slope() {
        let coeff = fit_line(0, &[2.0, 2.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert_eq!(coeff.slope, 0.0);
        assert_approx_eq!(coeff.intercept, 3.0, 1e-12);
    }

    #[test]
    fn missing_pairs_are_dropped() {
        let x = [1.0, f64::NAN, 3.0, 4.0];
        let y = [1.0, 100.0, 3.0, f64::NAN];
        let coeff = fit_line(0, &x, &y).unwrap();
        assert_approx_eq!(coeff.slope, 1.0, 1e-9);
        assert_approx_eq!(coeff.intercept, 0.0, 1e-9);
    }
}
