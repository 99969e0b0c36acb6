//! Error types shared by the partitioner, the renderer and the demo collaborators.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("Found input variables with inconsistent numbers of samples: [{left}, {right}]")]
    LengthMismatch { left: usize, right: usize },

    #[error("Input data has to be 2-d for visualization. The input data has {shape:?}.")]
    NotTwoDimensional { shape: (usize, usize) },

    #[error("y should be a 1d array, got an array of shape {shape:?} instead.")]
    NotOneDimensional { shape: Vec<usize> },

    #[error("Found array with {n_samples} sample(s) while a minimum of 1 is required.")]
    EmptyInput { n_samples: usize },

    #[error("Input contains NaN or infinity at row {row}, column {column}.")]
    NonFinite { row: usize, column: usize },

    #[error("Label {value} at index {index} is neither 0 (inlier) nor 1 (outlier).")]
    InvalidLabel { index: usize, value: u8 },

    #[error("Unknown colour identifier: {0:?}")]
    UnknownColor(String),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Detector not fitted: call fit() before {0}()")]
    NotFitted(&'static str),

    #[error("No image viewer found; set VISUALIZER_VIEWER or install xdg-open")]
    ViewerUnavailable,

    #[error("Image viewer exited with status {0}")]
    ViewerFailed(std::process::ExitStatus),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VizError>;

/// Folds a plotting-backend error into [`VizError::Render`].
pub fn render_err<E: std::fmt::Display>(e: E) -> VizError {
    VizError::Render(e.to_string())
}

pub(crate) fn invalid_param(name: &str, reason: impl Into<String>) -> VizError {
    VizError::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
}
