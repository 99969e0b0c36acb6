//! Local Outlier Factor: compares the local density of a sample with the
//! densities of its nearest neighbours.

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::{debug, info, warn};

use super::{check_contamination, not_fitted, FittedScores, OutlierDetector};
use crate::error::{invalid_param, Result, VizError};

/// Added to the mean reachability distance so duplicated points do not
/// produce infinite densities.
const DENSITY_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct Lof {
    n_neighbors: usize,
    contamination: f64,
    model: Option<LofModel>,
}

#[derive(Debug, Clone)]
struct LofModel {
    train: Array2<f64>,
    k: usize,
    /// Distance from each training sample to its k-th neighbour.
    k_distance: Array1<f64>,
    /// Local reachability density of each training sample.
    lrd: Array1<f64>,
    scores: FittedScores,
}

impl Default for Lof {
    fn default() -> Self {
        Self {
            n_neighbors: 20,
            contamination: 0.1,
            model: None,
        }
    }
}

fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// The `k` training rows closest to `point` as `(index, distance)`, nearest
/// first, optionally skipping the row `exclude`. Ties go to the lower index.
fn k_nearest(
    train: ArrayView2<'_, f64>,
    point: ArrayView1<'_, f64>,
    k: usize,
    exclude: Option<usize>,
) -> Vec<(usize, f64)> {
    let mut neighbours: Vec<(usize, f64)> = train
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(j, _)| Some(*j) != exclude)
        .map(|(j, row)| (j, euclidean(point, row)))
        .collect();
    neighbours.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
    neighbours.truncate(k);
    neighbours
}

/// Density of a sample from its neighbours' k-distances and its distances to them.
fn reachability_density(neighbours: &[(usize, f64)], k_distance: &Array1<f64>) -> f64 {
    let mean_reach = neighbours
        .iter()
        .map(|&(j, d)| d.max(k_distance[j]))
        .sum::<f64>()
        / neighbours.len() as f64;
    1.0 / (mean_reach + DENSITY_EPSILON)
}

fn outlier_factor(neighbours: &[(usize, f64)], lrd: &Array1<f64>, own_lrd: f64) -> f64 {
    neighbours.iter().map(|&(j, _)| lrd[j] / own_lrd).sum::<f64>() / neighbours.len() as f64
}

impl Lof {
    pub fn new(n_neighbors: usize, contamination: f64) -> Result<Self> {
        if n_neighbors == 0 {
            return Err(invalid_param("n_neighbors", "must be at least 1"));
        }
        Ok(Self {
            n_neighbors,
            contamination: check_contamination(contamination)?,
            model: None,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    fn model(&self, op: &'static str) -> Result<&LofModel> {
        self.model.as_ref().ok_or_else(|| not_fitted(op))
    }
}

impl OutlierDetector for Lof {
    fn name(&self) -> &str {
        "LOF"
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>) -> Result<()> {
        let n = x.nrows();
        if n < 2 {
            return Err(VizError::EmptyInput { n_samples: n });
        }
        if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(VizError::NonFinite { row, column });
        }

        let k = self.n_neighbors.min(n - 1).max(1);
        if k < self.n_neighbors {
            warn!(
                "n_neighbors ({}) is not below the sample count ({}); using {}",
                self.n_neighbors, n, k
            );
        }

        let neighbourhoods: Vec<Vec<(usize, f64)>> =
            (0..n).map(|i| k_nearest(x, x.row(i), k, Some(i))).collect();
        let k_distance: Array1<f64> = neighbourhoods.iter().map(|nb| nb[k - 1].1).collect();
        let lrd: Array1<f64> = neighbourhoods
            .iter()
            .map(|nb| reachability_density(nb, &k_distance))
            .collect();
        let decision_scores: Array1<f64> = neighbourhoods
            .iter()
            .zip(lrd.iter())
            .map(|(nb, &own)| outlier_factor(nb, &lrd, own))
            .collect();

        let scores = FittedScores::from_scores(decision_scores, self.contamination)?;
        info!(
            "Fitted LOF on {} samples (k = {}), threshold {:.4}",
            n, k, scores.threshold
        );

        self.model = Some(LofModel {
            train: x.to_owned(),
            k,
            k_distance,
            lrd,
            scores,
        });
        Ok(())
    }

    fn decision_scores(&self) -> Result<ArrayView1<'_, f64>> {
        Ok(self.model("decision_scores")?.scores.decision_scores.view())
    }

    fn labels(&self) -> Result<ArrayView1<'_, u8>> {
        Ok(self.model("labels")?.scores.labels.view())
    }

    fn threshold(&self) -> Result<f64> {
        Ok(self.model("threshold")?.scores.threshold)
    }

    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let model = self.model("decision_function")?;
        if x.ncols() != model.train.ncols() {
            return Err(invalid_param(
                "x",
                format!(
                    "expected {} features, got {}",
                    model.train.ncols(),
                    x.ncols()
                ),
            ));
        }
        debug!("Scoring {} samples against {} training samples", x.nrows(), model.train.nrows());

        Ok(x
            .rows()
            .into_iter()
            .map(|point| {
                let nb = k_nearest(model.train.view(), point, model.k, None);
                let own = reachability_density(&nb, &model.k_distance);
                outlier_factor(&nb, &model.lrd, own)
            })
            .collect())
    }
}
