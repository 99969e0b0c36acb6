use std::env;
use std::path::PathBuf;

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewD};
use ndarray_stats::interpolate::Linear;
use ndarray_stats::Quantile1dExt;
use noisy_float::types::{n64, N64};

use crate::error::{invalid_param, Result, VizError};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Flattens a label vector to one dimension.
///
/// Any shape with at most one axis longer than 1 is accepted, so `(n,)`,
/// `(n, 1)` and `(1, n)` all become a length-`n` vector. Scalars and true
/// matrices are rejected.
pub fn column_or_1d(y: ArrayViewD<'_, u8>) -> Result<Array1<u8>> {
    let shape = y.shape();
    let long_axes = shape.iter().filter(|&&d| d != 1).count();
    if shape.is_empty() || long_axes > 1 {
        return Err(VizError::NotOneDimensional {
            shape: shape.to_vec(),
        });
    }
    Ok(y.iter().copied().collect())
}

/// Fails unless every length equals the first one.
pub fn check_consistent_length(lengths: &[usize]) -> Result<()> {
    if let Some((&first, rest)) = lengths.split_first() {
        if let Some(&other) = rest.iter().find(|&&n| n != first) {
            return Err(VizError::LengthMismatch {
                left: first,
                right: other,
            });
        }
    }
    Ok(())
}

/// Validates a sample matrix against its labels and returns the flattened labels.
///
/// The matrix must hold at least one sample and only finite values, and the
/// label count must match its row count.
pub fn check_x_y(x: ArrayView2<'_, f64>, y: ArrayViewD<'_, u8>) -> Result<Array1<u8>> {
    let y = column_or_1d(y)?;
    if x.nrows() == 0 {
        return Err(VizError::EmptyInput { n_samples: 0 });
    }
    if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(VizError::NonFinite { row, column });
    }
    check_consistent_length(&[x.nrows(), y.len()])?;
    Ok(y)
}

/// The `q`-th percentile (0..=100) of `values`, interpolating linearly
/// between the two nearest ranks.
pub fn percentile(values: ArrayView1<'_, f64>, q: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&q) {
        return Err(invalid_param("percentile", format!("must be in [0, 100], got {q}")));
    }
    let mut ranked = values
        .iter()
        .enumerate()
        .map(|(i, &v)| N64::try_new(v).ok_or(VizError::NonFinite { row: i, column: 0 }))
        .collect::<Result<Array1<N64>>>()?;
    ranked
        .quantile_mut(n64(q / 100.0), &Linear)
        .map(|v| v.raw())
        .map_err(|e| invalid_param("values", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, ArrayD, IxDyn};
    use float_cmp::approx_eq;
    use test_case::test_case;

    #[test_case(&[5] ; "flat vector")]
    #[test_case(&[5, 1] ; "column vector")]
    #[test_case(&[1, 5] ; "row vector")]
    #[test_case(&[1, 5, 1] ; "padded rank three")]
    fn column_or_1d_flattens(shape: &[usize]) {
        let y = ArrayD::from_shape_vec(IxDyn(shape), vec![0u8, 1, 0, 0, 1]).unwrap();
        let flat = column_or_1d(y.view()).unwrap();
        assert_eq!(flat, array![0u8, 1, 0, 0, 1]);
    }

    #[test]
    fn column_or_1d_rejects_matrices_and_scalars() {
        let m = ArrayD::<u8>::zeros(IxDyn(&[2, 3]));
        assert!(matches!(
            column_or_1d(m.view()),
            Err(VizError::NotOneDimensional { ref shape }) if shape == &vec![2, 3]
        ));

        let scalar = ArrayD::<u8>::zeros(IxDyn(&[]));
        assert!(column_or_1d(scalar.view()).is_err());
    }

    #[test]
    fn consistent_length_reports_first_mismatch() {
        assert!(check_consistent_length(&[]).is_ok());
        assert!(check_consistent_length(&[3, 3, 3]).is_ok());
        assert!(matches!(
            check_consistent_length(&[3, 3, 4]),
            Err(VizError::LengthMismatch { left: 3, right: 4 })
        ));
    }

    #[test]
    fn check_x_y_rejects_bad_inputs() {
        let x = array![[0.0, 1.0], [2.0, 3.0]];
        let y = array![0u8, 1].into_dyn();
        assert_eq!(check_x_y(x.view(), y.view()).unwrap(), array![0u8, 1]);

        let short = array![0u8].into_dyn();
        assert!(matches!(
            check_x_y(x.view(), short.view()),
            Err(VizError::LengthMismatch { left: 2, right: 1 })
        ));

        let empty = Array2::<f64>::zeros((0, 2));
        let no_labels = ArrayD::<u8>::zeros(IxDyn(&[0]));
        assert!(matches!(
            check_x_y(empty.view(), no_labels.view()),
            Err(VizError::EmptyInput { .. })
        ));

        let nan = array![[0.0, 1.0], [f64::NAN, 3.0]];
        assert!(matches!(
            check_x_y(nan.view(), y.view()),
            Err(VizError::NonFinite { row: 1, column: 0 })
        ));
    }

    #[test_case(0.0, 1.0)]
    #[test_case(50.0, 2.5)]
    #[test_case(90.0, 3.7)]
    #[test_case(100.0, 4.0)]
    fn percentile_interpolates_linearly(q: f64, expected: f64) {
        let values = array![4.0, 1.0, 3.0, 2.0];
        assert!(approx_eq!(f64, percentile(values.view(), q).unwrap(), expected, epsilon = 1e-12));
    }

    #[test]
    fn percentile_rejects_bad_input() {
        let values = array![1.0, 2.0];
        assert!(percentile(values.view(), 101.0).is_err());
        assert!(percentile(array![1.0, f64::NAN].view(), 50.0).is_err());
        assert!(percentile(Array1::<f64>::zeros(0).view(), 50.0).is_err());
    }
}
