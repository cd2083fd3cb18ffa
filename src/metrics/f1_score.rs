//! F1 score over matched detections.

use crate::metrics::precision_recall::{calculate_precision_recall, PrecisionRecall};

/// Harmonic mean of precision and recall.
///
/// `F1 = 2PR / (P + R)`, and 0.0 when `P + R` is zero so an evaluation with no
/// true positives never produces NaN.
///
/// # Example
///
/// ```
/// use detection_eval::metrics::f1_score::calculate_f1_score;
///
/// // 3 of 4 predictions matched, 3 of 5 ground truths found
/// let f1 = calculate_f1_score(0.75, 0.6);
/// assert!((f1 - 2.0 / 3.0).abs() < 1e-10);
/// assert_eq!(calculate_f1_score(0.0, 0.0), 0.0);
/// ```
pub fn calculate_f1_score(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum <= 0.0 {
        return 0.0;
    }

    2.0 * precision * recall / sum
}

pub fn calculate_f1_from_pr(pr: &PrecisionRecall) -> f64 {
    calculate_f1_score(pr.precision, pr.recall)
}

/// F1 straight from TP/FP/FN totals.
///
/// # Example
///
/// ```
/// use detection_eval::metrics::f1_score::calculate_f1_from_counts;
///
/// let f1 = calculate_f1_from_counts(3, 1, 2);
/// assert!((f1 - 2.0 / 3.0).abs() < 1e-10);
/// ```
pub fn calculate_f1_from_counts(tp: usize, fp: usize, fn_: usize) -> f64 {
    calculate_f1_from_pr(&calculate_precision_recall(tp, fp, fn_))
}
