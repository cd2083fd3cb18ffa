//! Precision and recall calculation.

use serde::{Deserialize, Serialize};

/// Precision and recall values with the counts they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Calculate precision from confusion matrix values
///
/// Precision = TP / (TP + FP), defined as 0.0 when there are no predictions.
///
/// # Examples
///
/// ```
/// # use detection_eval::metrics::precision_recall::calculate_precision;
/// assert_eq!(calculate_precision(80, 20), 0.8);
/// assert_eq!(calculate_precision(0, 0), 0.0);
/// ```
#[must_use]
pub fn calculate_precision(tp: usize, fp: usize) -> f64 {
    let denominator = tp + fp;
    if denominator == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let precision = (tp as f64) / (denominator as f64);

    debug_assert!(
        (0.0..=1.0).contains(&precision),
        "Precision must be between 0 and 1, got {precision}"
    );

    precision
}

/// Calculate recall from confusion matrix values
///
/// Recall = TP / (TP + FN), defined as 0.0 when there is no ground truth.
///
/// # Examples
///
/// ```
/// # use detection_eval::metrics::precision_recall::calculate_recall;
/// assert_eq!(calculate_recall(80, 20), 0.8);
/// assert_eq!(calculate_recall(0, 0), 0.0);
/// ```
#[must_use]
pub fn calculate_recall(tp: usize, fn_: usize) -> f64 {
    let denominator = tp + fn_;
    if denominator == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let recall = (tp as f64) / (denominator as f64);

    debug_assert!(
        (0.0..=1.0).contains(&recall),
        "Recall must be between 0 and 1, got {recall}"
    );

    recall
}

/// Calculate precision and recall from TP, FP, and FN counts.
///
/// # Example
///
/// ```
/// use detection_eval::metrics::precision_recall::calculate_precision_recall;
///
/// let pr = calculate_precision_recall(8, 2, 3);
/// assert!((pr.precision - 0.8).abs() < 1e-10);
/// assert!((pr.recall - 8.0 / 11.0).abs() < 1e-10);
/// ```
pub fn calculate_precision_recall(
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
) -> PrecisionRecall {
    PrecisionRecall {
        precision: calculate_precision(true_positives, false_positives),
        recall: calculate_recall(true_positives, false_negatives),
        true_positives,
        false_positives,
        false_negatives,
    }
}
