use polars::prelude::PolarsError;
use thiserror::Error;

/// Everything that can abort a [`regression_plot`](crate::regression_plot)
/// call. All variants are fail-fast; nothing is retried internally.
#[derive(Debug, Error)]
pub enum RegvizError {
    /// The inputs are not in the expected grouped/flat shape.
    #[error("invalid input kind: {0}")]
    InvalidInputKind(String),

    /// A subject's X and Y lengths differ at normalization time.
    #[error("subject {subject}: x has {x_len} values but y has {y_len}")]
    ShapeMismatch {
        subject: usize,
        x_len: usize,
        y_len: usize,
    },

    /// A subject's X and Y lengths differ after preprocessing.
    #[error("subject {subject} after preprocessing: x has {x_len} values but y has {y_len}")]
    SubjectShapeMismatch {
        subject: usize,
        x_len: usize,
        y_len: usize,
    },

    /// The one-sample slope test needs at least two usable subjects.
    #[error("slope test needs at least 2 usable subjects, found {found}")]
    InsufficientSubjects { found: usize },

    /// The normal-equation solve failed (X'X singular beyond the
    /// degenerate-X short circuit).
    #[error("least-squares fit failed for subject {subject}: {reason}")]
    Fit { subject: usize, reason: String },

    /// Column extraction in the DataFrame adapter failed.
    #[error(transparent)]
    Data(#[from] PolarsError),

    /// The plotters adapter could not draw.
    #[error("rendering failed: {0}")]
    Render(String),
}
