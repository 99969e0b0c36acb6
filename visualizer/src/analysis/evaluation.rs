use std::cmp::Ordering;
use std::fmt;

use ndarray::ArrayView1;
use tracing::info;

use crate::error::{invalid_param, Result};
use crate::helper_functions::{check_consistent_length, percentile};
use crate::models::OUTLIER;

/// Holds FPR/TPR pairs, thresholds, and the final AUC for one ROC curve.
#[derive(Debug, Clone)]
pub struct RocResult {
    pub fprs: Vec<f64>,
    pub tprs: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

/// Compute ROC curve points (FPR/TPR) and AUC for a set of `scores` and boolean `labels`
/// (`true` = outlier).
///
/// 1) Pair each (score, label) and sort descending by score.
/// 2) Sweep thresholds from high to low; samples sharing a score enter together.
/// 3) Integrate with the trapezoidal rule.
///
/// Needs both classes present.
pub fn compute_roc(scores: &[f64], labels: &[bool]) -> Result<RocResult> {
    check_consistent_length(&[scores.len(), labels.len()])?;
    let total_pos = labels.iter().filter(|&&l| l).count() as f64;
    let total_neg = labels.len() as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return Err(invalid_param(
            "labels",
            "only one class present; ROC AUC is undefined",
        ));
    }

    let mut pairs: Vec<(f64, bool)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    pairs.sort_by(|(s1, _), (s2, _)| s2.partial_cmp(s1).unwrap_or(Ordering::Equal));

    let mut fprs = vec![0.0];
    let mut tprs = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];
    let (mut tp, mut fp) = (0.0, 0.0);
    let mut auc = 0.0;

    let mut idx = 0;
    while idx < pairs.len() {
        let score = pairs[idx].0;
        while idx < pairs.len() && pairs[idx].0 == score {
            if pairs[idx].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            idx += 1;
        }

        let (tpr, fpr) = (tp / total_pos, fp / total_neg);
        let (prev_fpr, prev_tpr) = (fprs[fprs.len() - 1], tprs[tprs.len() - 1]);
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) * 0.5;

        fprs.push(fpr);
        tprs.push(tpr);
        thresholds.push(score);
    }

    Ok(RocResult {
        fprs,
        tprs,
        thresholds,
        auc,
    })
}

/// Precision among the `n` highest-scored samples, where `n` defaults to
/// the number of true outliers.
///
/// A sample counts as flagged when its score is strictly above the
/// `1 - n / len` percentile; nothing flagged gives a precision of zero.
pub fn precision_n_scores(
    y: ArrayView1<'_, u8>,
    scores: ArrayView1<'_, f64>,
    n: Option<usize>,
) -> Result<f64> {
    check_consistent_length(&[y.len(), scores.len()])?;
    let n_outliers = n.unwrap_or_else(|| y.iter().filter(|&&l| l == OUTLIER).count());
    let fraction = n_outliers as f64 / scores.len() as f64;
    let threshold = percentile(scores, 100.0 * (1.0 - fraction).clamp(0.0, 1.0))?;

    let (mut tp, mut flagged) = (0usize, 0usize);
    for (&label, &score) in y.iter().zip(scores.iter()) {
        if score > threshold {
            flagged += 1;
            if label == OUTLIER {
                tp += 1;
            }
        }
    }
    Ok(if flagged == 0 {
        0.0
    } else {
        tp as f64 / flagged as f64
    })
}

/// Ranking quality of one detector on one split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub roc: f64,
    pub precision_at_n: f64,
}

impl Evaluation {
    pub fn compute(y: ArrayView1<'_, u8>, scores: ArrayView1<'_, f64>) -> Result<Self> {
        let labels: Vec<bool> = y.iter().map(|&l| l == OUTLIER).collect();
        let scores_vec = scores.to_vec();
        let roc = compute_roc(&scores_vec, &labels)?.auc;
        let precision_at_n = precision_n_scores(y, scores, None)?;
        Ok(Self {
            roc,
            precision_at_n,
        })
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ROC:{:.4}, precision @ rank n:{:.4}",
            self.roc, self.precision_at_n
        )
    }
}

/// Computes and prints the ROC AUC and precision @ rank n of `scores`
/// against the ground truth `y`.
pub fn evaluate_print(
    name: &str,
    y: ArrayView1<'_, u8>,
    scores: ArrayView1<'_, f64>,
) -> Result<Evaluation> {
    let evaluation = Evaluation::compute(y, scores)?;
    info!("Evaluated {} on {} samples", name, y.len());
    println!("{name} {evaluation}");
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use ndarray::array;

    #[test]
    fn perfect_ranking_has_unit_auc() {
        let roc = compute_roc(&[0.9, 0.8, 0.3, 0.1], &[true, true, false, false]).unwrap();
        assert!(approx_eq!(f64, roc.auc, 1.0, epsilon = 1e-12));
        assert_eq!(roc.fprs.first(), Some(&0.0));
        assert_eq!(roc.tprs.last(), Some(&1.0));
    }

    #[test]
    fn reversed_ranking_has_zero_auc() {
        let roc = compute_roc(&[0.1, 0.2, 0.8, 0.9], &[true, true, false, false]).unwrap();
        assert!(approx_eq!(f64, roc.auc, 0.0, epsilon = 1e-12));
    }

    #[test]
    fn tied_scores_count_half() {
        let roc = compute_roc(&[0.5, 0.5], &[true, false]).unwrap();
        assert!(approx_eq!(f64, roc.auc, 0.5, epsilon = 1e-12));
        assert_eq!(roc.thresholds.len(), 2);
    }

    #[test]
    fn mixed_ranking() {
        // One of the four positive/negative pairs is misordered.
        let roc = compute_roc(&[0.9, 0.7, 0.6, 0.2], &[true, false, true, false]).unwrap();
        assert!(approx_eq!(f64, roc.auc, 0.75, epsilon = 1e-12));
    }

    #[test]
    fn single_class_is_rejected() {
        assert!(compute_roc(&[0.1, 0.2], &[false, false]).is_err());
    }

    #[test]
    fn precision_at_rank_n() {
        let y = array![0u8, 0, 1, 1, 0];
        let scores = array![0.1, 0.9, 0.8, 0.7, 0.2];
        // Two outliers: the top two scores are 0.9 (inlier) and 0.8 (outlier).
        let p = precision_n_scores(y.view(), scores.view(), None).unwrap();
        assert!(approx_eq!(f64, p, 0.5, epsilon = 1e-12));

        let p = precision_n_scores(y.view(), scores.view(), Some(3)).unwrap();
        assert!(approx_eq!(f64, p, 2.0 / 3.0, epsilon = 1e-12));
    }

    #[test]
    fn evaluation_display_matches_report_format() {
        let y = array![0u8, 1, 0, 1];
        let scores = array![0.1, 0.9, 0.2, 0.8];
        let evaluation = evaluate_print("LOF", y.view(), scores.view()).unwrap();
        assert_eq!(evaluation.to_string(), "ROC:1.0000, precision @ rank n:1.0000");
    }
}
