//! Splits a labelled sample matrix into its outlier and inlier rows.

use ndarray::{ArrayView1, ArrayView2, Axis};
use tracing::debug;

use crate::error::{Result, VizError};
use crate::helper_functions::check_consistent_length;
use crate::models::{Partition, INLIER, OUTLIER};

/// Selects the rows of `x` labelled 1 into `outliers` and those labelled 0
/// into `inliers`, keeping ascending row order and the column count.
///
/// Labels other than 0 or 1 are rejected rather than silently dropped, so
/// the two subsets always cover every row exactly once.
pub fn partition(x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> Result<Partition> {
    check_consistent_length(&[x.nrows(), y.len()])?;

    let mut outlier_rows = Vec::new();
    let mut inlier_rows = Vec::with_capacity(y.len());
    for (index, &value) in y.iter().enumerate() {
        match value {
            OUTLIER => outlier_rows.push(index),
            INLIER => inlier_rows.push(index),
            _ => return Err(VizError::InvalidLabel { index, value }),
        }
    }

    debug!(
        "Partitioned {} rows into {} outliers / {} inliers",
        x.nrows(),
        outlier_rows.len(),
        inlier_rows.len()
    );

    Ok(Partition {
        outliers: x.select(Axis(0), &outlier_rows),
        inliers: x.select(Axis(0), &inlier_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    fn sample() -> (Array2<f64>, Array1<u8>) {
        let x = array![
            [0.0, 0.5],
            [1.0, 1.5],
            [2.0, 2.5],
            [3.0, 3.5],
            [4.0, 4.5],
            [5.0, 5.5],
        ];
        let y = array![0u8, 1, 0, 0, 1, 0];
        (x, y)
    }

    #[test]
    fn split_is_total_disjoint_and_ordered() {
        let (x, y) = sample();
        let p = partition(x.view(), y.view()).unwrap();

        assert_eq!(p.n_outliers() + p.n_inliers(), x.nrows());
        assert_eq!(p.outliers, array![[1.0, 1.5], [4.0, 4.5]]);
        assert_eq!(
            p.inliers,
            array![[0.0, 0.5], [2.0, 2.5], [3.0, 3.5], [5.0, 5.5]]
        );
        for row in p.outliers.rows() {
            assert!(!p.inliers.rows().into_iter().any(|r| r == row));
        }
    }

    #[test]
    fn repeated_calls_agree_and_leave_inputs_untouched() {
        let (x, y) = sample();
        let (x_before, y_before) = (x.clone(), y.clone());

        let first = partition(x.view(), y.view()).unwrap();
        let second = partition(x.view(), y.view()).unwrap();

        assert_eq!(first, second);
        assert_eq!(x, x_before);
        assert_eq!(y, y_before);
    }

    #[test]
    fn all_inliers_leaves_an_empty_two_column_outlier_set() {
        let (x, _) = sample();
        let y = Array1::<u8>::zeros(x.nrows());
        let p = partition(x.view(), y.view()).unwrap();

        assert_eq!(p.outliers.dim(), (0, 2));
        assert_eq!(p.inliers, x);
    }

    #[test]
    fn all_outliers_leaves_an_empty_inlier_set() {
        let (x, _) = sample();
        let y = Array1::<u8>::ones(x.nrows());
        let p = partition(x.view(), y.view()).unwrap();

        assert_eq!(p.inliers.dim(), (0, 2));
        assert_eq!(p.outliers, x);
    }

    #[test]
    fn feature_count_is_not_restricted_here() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let y = array![1u8, 0];
        let p = partition(x.view(), y.view()).unwrap();
        assert_eq!(p.outliers.dim(), (1, 3));
        assert_eq!(p.inliers.dim(), (1, 3));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let (x, _) = sample();
        let y = array![0u8, 1, 0];
        assert!(matches!(
            partition(x.view(), y.view()),
            Err(VizError::LengthMismatch { left: 6, right: 3 })
        ));
    }

    #[test]
    fn out_of_range_label_is_rejected() {
        let (x, _) = sample();
        let y = array![0u8, 1, 2, 0, 1, 0];
        assert!(matches!(
            partition(x.view(), y.view()),
            Err(VizError::InvalidLabel { index: 2, value: 2 })
        ));
    }
}
