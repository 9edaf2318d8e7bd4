use std::collections::BTreeMap;

use polars::prelude::{DataFrame, DataType};

use crate::error::RegvizError;

/// One subject's paired observations. Missing values are `f64::NAN`.
#[derive(Debug, Clone, Default)]
pub struct SubjectSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl SubjectSeries {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        SubjectSeries { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// A subject contributes no geometry and no coefficient row when its
    /// series is empty or entirely missing in either coordinate.
    pub fn is_skipped(&self) -> bool {
        self.is_empty()
            || self.x.iter().all(|v| v.is_nan())
            || self.y.iter().all(|v| v.is_nan())
    }
}

/// The two accepted input shapes. `Grouped` carries one series per
/// subject; `FlatWithIds` is grouped by the distinct id values (ascending)
/// while preserving the original ordering within each subject.
#[derive(Debug, Clone)]
pub enum RegressionInput {
    Grouped {
        x: Vec<Vec<f64>>,
        y: Vec<Vec<f64>>,
    },
    FlatWithIds {
        x: Vec<f64>,
        y: Vec<f64>,
        subject_ids: Vec<i64>,
    },
}

impl RegressionInput {
    /// Resolve either shape into the canonical ordered per-subject form.
    pub fn normalize(self) -> Result<Vec<SubjectSeries>, RegvizError> {
        match self {
            RegressionInput::Grouped { x, y } => {
                if x.len() != y.len() {
                    return Err(RegvizError::InvalidInputKind(format!(
                        "grouped x has {} subjects but y has {}",
                        x.len(),
                        y.len()
                    )));
                }
                let mut subjects = Vec::with_capacity(x.len());
                for (i, (sx, sy)) in x.into_iter().zip(y.into_iter()).enumerate() {
                    if sx.len() != sy.len() {
                        return Err(RegvizError::ShapeMismatch {
                            subject: i,
                            x_len: sx.len(),
                            y_len: sy.len(),
                        });
                    }
                    subjects.push(SubjectSeries::new(sx, sy));
                }
                Ok(subjects)
            }
            RegressionInput::FlatWithIds { x, y, subject_ids } => {
                if x.len() != y.len() || x.len() != subject_ids.len() {
                    return Err(RegvizError::InvalidInputKind(format!(
                        "flat input lengths differ: x {}, y {}, subject_ids {}",
                        x.len(),
                        y.len(),
                        subject_ids.len()
                    )));
                }
                // BTreeMap keeps the distinct ids in ascending order; the
                // push order preserves the original within-subject order.
                let mut groups: BTreeMap<i64, SubjectSeries> = BTreeMap::new();
                for ((xv, yv), id) in x.into_iter().zip(y.into_iter()).zip(subject_ids) {
                    let series = groups.entry(id).or_default();
                    series.x.push(xv);
                    series.y.push(yv);
                }
                Ok(groups.into_values().collect())
            }
        }
    }

    /// Build the flat form from three DataFrame columns. Null x/y cells
    /// become NaN; the id column is cast to Int64 and must be non-null.
    pub fn from_dataframe(
        df: &DataFrame,
        x_col: &str,
        y_col: &str,
        id_col: &str,
    ) -> Result<Self, RegvizError> {
        let x: Vec<f64> = df
            .column(x_col)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let y: Vec<f64> = df
            .column(y_col)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        let ids = df.column(id_col)?.cast(&DataType::Int64)?;
        let mut subject_ids = Vec::with_capacity(df.height());
        for (row, id) in ids.i64()?.into_iter().enumerate() {
            match id {
                Some(id) => subject_ids.push(id),
                None => {
                    return Err(RegvizError::InvalidInputKind(format!(
                        "null subject id in column '{id_col}' at row {row}"
                    )))
                }
            }
        }

        Ok(RegressionInput::FlatWithIds { x, y, subject_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn grouped_passes_through() {
        let input = RegressionInput::Grouped {
            x: vec![vec![1.0, 2.0], vec![3.0]],
            y: vec![vec![4.0, 5.0], vec![6.0]],
        };
        let subjects = input.normalize().unwrap();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].x, vec![1.0, 2.0]);
        assert_eq!(subjects[1].y, vec![6.0]);
    }

    #[test]
    fn grouped_subject_count_mismatch() {
        let input = RegressionInput::Grouped {
            x: vec![vec![1.0]],
            y: vec![vec![1.0], vec![2.0]],
        };
        assert!(matches!(
            input.normalize(),
            Err(RegvizError::InvalidInputKind(_))
        ));
    }

    #[test]
    fn grouped_length_mismatch_names_subject() {
        let input = RegressionInput::Grouped {
            x: vec![vec![1.0, 2.0], vec![1.0, 2.0]],
            y: vec![vec![1.0, 2.0], vec![1.0]],
        };
        match input.normalize() {
            Err(RegvizError::ShapeMismatch { subject, x_len, y_len }) => {
                assert_eq!(subject, 1);
                assert_eq!((x_len, y_len), (2, 1));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn flat_groups_by_ascending_id_preserving_order() {
        let input = RegressionInput::FlatWithIds {
            x: vec![10.0, 1.0, 11.0, 2.0],
            y: vec![20.0, 3.0, 21.0, 4.0],
            subject_ids: vec![7, 2, 7, 2],
        };
        let subjects = input.normalize().unwrap();
        assert_eq!(subjects.len(), 2);
        // id 2 first, then id 7, each in original row order
        assert_eq!(subjects[0].x, vec![1.0, 2.0]);
        assert_eq!(subjects[0].y, vec![3.0, 4.0]);
        assert_eq!(subjects[1].x, vec![10.0, 11.0]);
    }

    #[test]
    fn flat_length_mismatch() {
        let input = RegressionInput::FlatWithIds {
            x: vec![1.0, 2.0],
            y: vec![1.0],
            subject_ids: vec![1, 1],
        };
        assert!(matches!(
            input.normalize(),
            Err(RegvizError::InvalidInputKind(_))
        ));
    }

    #[test]
    fn skip_rule() {
        assert!(SubjectSeries::new(vec![], vec![]).is_skipped());
        assert!(SubjectSeries::new(vec![f64::NAN, f64::NAN], vec![1.0, 2.0]).is_skipped());
        assert!(SubjectSeries::new(vec![1.0, 2.0], vec![f64::NAN, f64::NAN]).is_skipped());
        assert!(!SubjectSeries::new(vec![1.0, f64::NAN], vec![f64::NAN, 2.0]).is_skipped());
    }

    #[test]
    fn from_dataframe_maps_nulls_to_nan() {
        let df = df![
            "x" => &[Some(1.0), None, Some(3.0)],
            "y" => &[Some(2.0), Some(4.0), None],
            "subject" => &[1i64, 1, 2]
        ]
        .unwrap();
        let input = RegressionInput::from_dataframe(&df, "x", "y", "subject").unwrap();
        let subjects = input.normalize().unwrap();
        assert_eq!(subjects.len(), 2);
        assert!(subjects[0].x[1].is_nan());
        assert!(subjects[1].y[0].is_nan());
    }
}
