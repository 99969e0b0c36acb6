use std::fmt;

use ndarray::{Array2, ArrayViewD, ArrayView2};

/// Label value of a normal sample.
pub const INLIER: u8 = 0;
/// Label value of an anomalous sample.
pub const OUTLIER: u8 = 1;

/// Rows of a sample matrix split by label, each subset in input row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub outliers: Array2<f64>,
    pub inliers: Array2<f64>,
}

impl Partition {
    pub fn n_outliers(&self) -> usize {
        self.outliers.nrows()
    }

    pub fn n_inliers(&self) -> usize {
        self.inliers.nrows()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the comparison renderer needs: both splits, their ground truth
/// and the detector's predicted labels.
///
/// Label and prediction vectors are taken as dynamic-rank views so column
/// vectors such as `(n, 1)` are accepted and flattened during validation.
#[derive(Debug, Clone)]
pub struct ComparisonData<'a> {
    pub x_train: ArrayView2<'a, f64>,
    pub y_train: ArrayViewD<'a, u8>,
    pub x_test: ArrayView2<'a, f64>,
    pub y_test: ArrayViewD<'a, u8>,
    pub y_train_pred: ArrayViewD<'a, u8>,
    pub y_test_pred: ArrayViewD<'a, u8>,
}
