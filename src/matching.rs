//! Detection matching utilities for evaluating predictions against ground truth.

use std::cmp::Ordering;

use crate::metrics::iou::calculate_iou_matrix;
use crate::types::{BoundingBox, ImageRecord, MatchOutcome};

/// An accepted prediction/ground-truth pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub prediction_index: usize,
    pub ground_truth_index: usize,
    pub iou: f64,
}

/// Match predictions to ground truth boxes for a single image.
///
/// Uses greedy, highest-IoU-first, one-to-one matching:
/// 1. every (prediction, ground truth) pair with `iou >= iou_threshold` and a
///    non-zero overlap is a candidate;
/// 2. candidates are sorted by IoU descending, ties broken by prediction index
///    ascending and then ground-truth index ascending;
/// 3. a candidate is accepted when neither of its boxes has been consumed yet.
///
/// This is not an optimal assignment. The tie-break order is part of the
/// contract and decides between equally good pairs.
///
/// # Returns
///
/// The accepted pairs, in acceptance order.
pub fn match_detections(
    predictions: &[BoundingBox],
    ground_truths: &[BoundingBox],
    iou_threshold: f64,
) -> Vec<Match> {
    if predictions.is_empty() || ground_truths.is_empty() {
        return Vec::new();
    }

    let ious = calculate_iou_matrix(predictions, ground_truths);

    let mut candidates: Vec<Match> = Vec::new();
    for (prediction_index, row) in ious.iter().enumerate() {
        for (ground_truth_index, &iou) in row.iter().enumerate() {
            if iou > 0.0 && iou >= iou_threshold {
                candidates.push(Match {
                    prediction_index,
                    ground_truth_index,
                    iou,
                });
            }
        }
    }

    candidates.sort_by(compare_candidates);

    let mut prediction_used = vec![false; predictions.len()];
    let mut ground_truth_used = vec![false; ground_truths.len()];
    let mut accepted = Vec::new();

    for candidate in candidates {
        if prediction_used[candidate.prediction_index]
            || ground_truth_used[candidate.ground_truth_index]
        {
            continue;
        }
        prediction_used[candidate.prediction_index] = true;
        ground_truth_used[candidate.ground_truth_index] = true;
        accepted.push(candidate);
    }

    accepted
}

/// IoU descending, then prediction index, then ground-truth index.
fn compare_candidates(a: &Match, b: &Match) -> Ordering {
    b.iou
        .total_cmp(&a.iou)
        .then(a.prediction_index.cmp(&b.prediction_index))
        .then(a.ground_truth_index.cmp(&b.ground_truth_index))
}

/// Count true positives, false positives and false negatives for one image.
///
/// The result always satisfies `tp + fp == predictions.len()` and
/// `tp + fn == ground_truths.len()`.
///
/// # Example
///
/// ```
/// use detection_eval::matching::match_boxes;
/// use detection_eval::types::BoundingBox;
///
/// let preds = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
/// let gts = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
/// let outcome = match_boxes(&preds, &gts, 0.5);
/// assert_eq!((outcome.tp, outcome.fp, outcome.fn_), (1, 0, 0));
/// ```
pub fn match_boxes(
    predictions: &[BoundingBox],
    ground_truths: &[BoundingBox],
    iou_threshold: f64,
) -> MatchOutcome {
    let tp = match_detections(predictions, ground_truths, iou_threshold).len();

    MatchOutcome {
        tp,
        fp: predictions.len() - tp,
        fn_: ground_truths.len() - tp,
    }
}

/// Match all predictions of an image record against its ground truth.
pub fn match_image(record: &ImageRecord, iou_threshold: f64) -> MatchOutcome {
    match_boxes(
        &record.prediction_boxes(),
        &record.ground_truth_boxes(),
        iou_threshold,
    )
}
