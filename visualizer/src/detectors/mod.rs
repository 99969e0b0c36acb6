//! Detection models consumed by the demo. The renderer only ever sees the
//! labels and scores they produce.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{invalid_param, Result, VizError};
use crate::helper_functions::percentile;
use crate::models::{INLIER, OUTLIER};

pub mod lof;

pub use lof::Lof;

/// A batch outlier detector. Higher scores mean more anomalous.
pub trait OutlierDetector {
    fn name(&self) -> &str;

    /// Learns from the training samples and scores them.
    fn fit(&mut self, x: ArrayView2<'_, f64>) -> Result<()>;

    /// Scores of the training samples.
    fn decision_scores(&self) -> Result<ArrayView1<'_, f64>>;

    /// Binary labels of the training samples (0 inlier, 1 outlier).
    fn labels(&self) -> Result<ArrayView1<'_, u8>>;

    /// Score above which a sample is labelled an outlier.
    fn threshold(&self) -> Result<f64>;

    /// Scores new samples against the fitted model.
    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>>;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<u8>> {
        let threshold = self.threshold()?;
        Ok(binarize(self.decision_function(x)?.view(), threshold))
    }
}

/// Training-time outputs shared by every detector.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScores {
    pub decision_scores: Array1<f64>,
    pub threshold: f64,
    pub labels: Array1<u8>,
}

impl FittedScores {
    /// Places the threshold so that a `contamination` fraction of the
    /// training scores lies above it.
    pub fn from_scores(decision_scores: Array1<f64>, contamination: f64) -> Result<Self> {
        let threshold = percentile(decision_scores.view(), 100.0 * (1.0 - contamination))?;
        let labels = binarize(decision_scores.view(), threshold);
        Ok(Self {
            decision_scores,
            threshold,
            labels,
        })
    }
}

pub fn binarize(scores: ArrayView1<'_, f64>, threshold: f64) -> Array1<u8> {
    scores.mapv(|s| if s > threshold { OUTLIER } else { INLIER })
}

pub(crate) fn check_contamination(contamination: f64) -> Result<f64> {
    if contamination > 0.0 && contamination <= 0.5 {
        Ok(contamination)
    } else {
        Err(invalid_param(
            "contamination",
            format!("must be in (0, 0.5], got {contamination}"),
        ))
    }
}

pub(crate) fn not_fitted(op: &'static str) -> VizError {
    VizError::NotFitted(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use ndarray::array;

    #[test]
    fn threshold_leaves_contamination_fraction_above() {
        let scores = Array1::from_iter((1..=10).map(f64::from));
        let fitted = FittedScores::from_scores(scores, 0.2).unwrap();
        assert!(approx_eq!(f64, fitted.threshold, 8.2, epsilon = 1e-12));
        assert_eq!(fitted.labels, array![0u8, 0, 0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn binarize_is_strict() {
        let scores = array![1.0, 2.0, 3.0];
        assert_eq!(binarize(scores.view(), 2.0), array![0u8, 0, 1]);
    }

    #[test]
    fn contamination_bounds() {
        assert!(check_contamination(0.1).is_ok());
        assert!(check_contamination(0.5).is_ok());
        assert!(check_contamination(0.0).is_err());
        assert!(check_contamination(0.75).is_err());
    }
}
