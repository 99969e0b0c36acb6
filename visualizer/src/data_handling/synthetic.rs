//! Seeded synthetic train/test data: a Gaussian blob of inliers with
//! uniformly scattered outliers around it.

use ndarray::{concatenate, Array1, Array2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use tracing::info;

use crate::error::{invalid_param, Result};
use crate::models::{INLIER, OUTLIER};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    /// Fraction of outliers in each split, in (0, 0.5].
    pub contamination: f64,
    /// Upper bound (exclusive) for the random centre of the inlier blob.
    pub offset: u32,
    pub seed: u64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            n_train: 200,
            n_test: 100,
            n_features: 2,
            contamination: 0.1,
            offset: 10,
            seed: 42,
        }
    }
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(invalid_param(
                "contamination",
                format!("must be in (0, 0.5], got {}", self.contamination),
            ));
        }
        if self.n_train == 0 || self.n_test == 0 {
            return Err(invalid_param("n_train/n_test", "both splits need at least one sample"));
        }
        if self.n_features == 0 {
            return Err(invalid_param("n_features", "must be at least 1"));
        }
        if self.offset == 0 {
            return Err(invalid_param("offset", "must be at least 1"));
        }
        Ok(())
    }

    /// Outliers in a split of `n` samples.
    pub fn n_outliers(&self, n: usize) -> usize {
        (n as f64 * self.contamination).floor() as usize
    }
}

/// Generated splits; within each split inliers come first, then outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticData {
    pub x_train: Array2<f64>,
    pub y_train: Array1<u8>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<u8>,
}

struct BlobShape {
    coef: f64,
    centre: f64,
}

fn generate_split(
    rng: &mut StdRng,
    shape: &BlobShape,
    n_samples: usize,
    n_outliers: usize,
    n_features: usize,
) -> Result<(Array2<f64>, Array1<u8>)> {
    let n_inliers = n_samples - n_outliers;
    let normal = Normal::new(0.0, 1.0).map_err(|e| invalid_param("normal", e.to_string()))?;
    let scatter = Uniform::new_inclusive(-shape.centre, shape.centre);

    let inliers = Array2::from_shape_simple_fn((n_inliers, n_features), || {
        shape.coef * normal.sample(&mut *rng) + shape.centre
    });
    let outliers = Array2::from_shape_simple_fn((n_outliers, n_features), || scatter.sample(&mut *rng));
    let x = concatenate(Axis(0), &[inliers.view(), outliers.view()])
        .map_err(|e| invalid_param("n_samples", e.to_string()))?;

    let y = std::iter::repeat(INLIER)
        .take(n_inliers)
        .chain(std::iter::repeat(OUTLIER).take(n_outliers))
        .collect();
    Ok((x, y))
}

/// Draws train and test splits from one seeded generator.
///
/// The blob spread `coef` and centre are drawn once and shared by both
/// splits, so the test set follows the training distribution. The same
/// parameters always yield the same data.
pub fn generate_data(params: &GeneratorParams) -> Result<SyntheticData> {
    params.validate()?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let shape = BlobShape {
        coef: rng.gen::<f64>() + 0.001,
        centre: rng.gen_range(0..params.offset) as f64,
    };

    let (x_train, y_train) = generate_split(
        &mut rng,
        &shape,
        params.n_train,
        params.n_outliers(params.n_train),
        params.n_features,
    )?;
    let (x_test, y_test) = generate_split(
        &mut rng,
        &shape,
        params.n_test,
        params.n_outliers(params.n_test),
        params.n_features,
    )?;

    info!(
        "Generated {} train / {} test samples with {} features (seed {})",
        params.n_train, params.n_test, params.n_features, params.seed
    );
    Ok(SyntheticData {
        x_train,
        y_train,
        x_test,
        y_test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_split_sizes() {
        let data = generate_data(&GeneratorParams::default()).unwrap();
        assert_eq!(data.x_train.dim(), (200, 2));
        assert_eq!(data.x_test.dim(), (100, 2));
        assert_eq!(data.y_train.iter().filter(|&&y| y == OUTLIER).count(), 20);
        assert_eq!(data.y_test.iter().filter(|&&y| y == OUTLIER).count(), 10);
        // Inliers first, then outliers.
        assert!(data.y_train.iter().take(180).all(|&y| y == INLIER));
        assert!(data.y_train.iter().skip(180).all(|&y| y == OUTLIER));
    }

    #[test]
    fn same_seed_same_data() {
        let params = GeneratorParams::default();
        assert_eq!(generate_data(&params).unwrap(), generate_data(&params).unwrap());

        let other = GeneratorParams { seed: 7, ..params.clone() };
        assert_ne!(generate_data(&params).unwrap(), generate_data(&other).unwrap());
    }

    #[test]
    fn supports_other_feature_counts() {
        let params = GeneratorParams {
            n_features: 3,
            ..GeneratorParams::default()
        };
        let data = generate_data(&params).unwrap();
        assert_eq!(data.x_train.ncols(), 3);
        assert!(data.x_train.iter().all(|v| v.is_finite()));
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(0.6 ; "above half")]
    #[test_case(f64::NAN ; "nan")]
    fn rejects_bad_contamination(contamination: f64) {
        let params = GeneratorParams {
            contamination,
            ..GeneratorParams::default()
        };
        assert!(generate_data(&params).is_err());
    }
}
