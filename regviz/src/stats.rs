use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::RegvizError;
use crate::input::SubjectSeries;

/// One-sample two-tailed test of the mean slope against zero.
#[derive(Debug, Clone, Copy)]
pub struct SlopeTest {
    pub t_stat: f64,
    pub df: usize,
    pub p_value: f64,
}

/// Pooled Pearson correlation over all subjects' concatenated pairs,
/// with the paired missing-value removal bookkeeping.
#[derive(Debug, Clone)]
pub struct PooledCorrelation {
    pub r: Option<f64>,
    /// One flag per concatenated observation, true where the pair was
    /// removed because either coordinate was NaN.
    pub missing_mask: Vec<bool>,
    pub missing_count: usize,
}

/// Test whether the subjects' mean slope differs from zero.
///
/// Zero cross-subject variance is an explicitly decided degenerate case:
/// identical nonzero slopes give `t = ±inf, p = 0`; identical zero slopes
/// give `t = 0, p = 1`. No variance regularization is applied.
pub fn slope_t_test(slopes: &[f64]) -> Result<SlopeTest, RegvizError> {
    let n = slopes.len();
    if n < 2 {
        return Err(RegvizError::InsufficientSubjects { found: n });
    }
    let df = n - 1;
    let mean = slopes.iter().sum::<f64>() / n as f64;
    let var = slopes.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / df as f64;

    if var == 0.0 {
        return Ok(if mean == 0.0 {
            SlopeTest {
                t_stat: 0.0,
                df,
                p_value: 1.0,
            }
        } else {
            SlopeTest {
                t_stat: mean.signum() * f64::INFINITY,
                df,
                p_value: 0.0,
            }
        });
    }

    let t_stat = mean / (var / n as f64).sqrt();
    let p_value = match StudentsT::new(0.0, 1.0, df as f64) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat.abs())),
        Err(_) => f64::NAN,
    };

    Ok(SlopeTest { t_stat, df, p_value })
}

/// Pearson correlation; `None` when the inputs are empty, unequal, or
/// have a zero denominator.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut num, mut denom_x, mut denom_y) = (0.0, 0.0, 0.0);
    for (&xv, &yv) in x.iter().zip(y.iter()) {
        let dx = xv - mean_x;
        let dy = yv - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    let denom = denom_x.sqrt() * denom_y.sqrt();
    if denom == 0.0 {
        return None;
    }

    Some(num / denom)
}

/// Concatenate every subject's working pairs in subject order, drop the
/// pairs with a NaN in either coordinate, and correlate the remainder.
/// The mask covers the full pre-removal concatenation.
pub fn pooled_correlation(subjects: &[SubjectSeries]) -> PooledCorrelation {
    let total: usize = subjects.iter().map(|s| s.len()).sum();
    let mut xs = Vec::with_capacity(total);
    let mut ys = Vec::with_capacity(total);
    let mut missing_mask = Vec::with_capacity(total);

    for series in subjects {
        for (&xv, &yv) in series.x.iter().zip(&series.y) {
            let missing = xv.is_nan() || yv.is_nan();
            missing_mask.push(missing);
            if !missing {
                xs.push(xv);
                ys.push(yv);
            }
        }
    }

    let missing_count = missing_mask.iter().filter(|&&m| m).count();
    PooledCorrelation {
        r: pearson_correlation(&xs, &ys),
        missing_mask,
        missing_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn t_test_matches_hand_computation() {
        // mean 2, sd 1, se = 1/sqrt(3) -> t = 2*sqrt(3), df = 2
        let test = slope_t_test(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(test.df, 2);
        assert_approx_eq!(test.t_stat, 3.464101615, 1e-8);
        assert_approx_eq!(test.p_value, 0.074180, 1e-4);
    }

    #[test]
    fn fewer_than_two_subjects_is_an_error() {
        assert!(matches!(
            slope_t_test(&[1.0]),
            Err(RegvizError::InsufficientSubjects { found: 1 })
        ));
    }

    #[test]
    fn zero_variance_slopes() {
        let test = slope_t_test(&[1.0, 1.0, 1.0]).unwrap();
        assert!(test.t_stat.is_infinite() && test.t_stat > 0.0);
        assert_eq!(test.p_value, 0.0);

        let negative = slope_t_test(&[-2.0, -2.0]).unwrap();
        assert!(negative.t_stat.is_infinite() && negative.t_stat < 0.0);

        let null = slope_t_test(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(null.t_stat, 0.0);
        assert_eq!(null.p_value, 1.0);
    }

    #[test]
    fn pooled_correlation_masks_every_missing_pair() {
        let subjects = vec![
            SubjectSeries::new(vec![1.0, f64::NAN, 3.0], vec![1.0, 2.0, 3.0]),
            SubjectSeries::new(vec![4.0, 5.0], vec![f64::NAN, 5.0]),
        ];
        let pooled = pooled_correlation(&subjects);
        assert_eq!(pooled.missing_mask.len(), 5);
        assert_eq!(pooled.missing_count, 2);
        assert_eq!(pooled.missing_mask, vec![false, true, false, true, false]);
        assert_approx_eq!(pooled.r.unwrap(), 1.0, 1e-12);
    }

    #[test]
    fn constant_series_has_no_correlation() {
        assert_eq!(pearson_correlation(&[1.0, 1.0], &[1.0, 2.0]), None);
        assert_eq!(pearson_correlation(&[], &[]), None);
    }
}
