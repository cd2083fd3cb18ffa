/// Non-Maximum Suppression (`NMS`) implementation
///
/// This module provides `NMS` functionality for filtering overlapping detections
/// of a single image. It reuses the same `IoU` primitive as the matcher.

use crate::error::Result;
use crate::metrics::iou::calculate_iou;
use crate::threshold::validate_threshold;
use crate::types::Detection;

/// Indices of `detections` ordered by confidence descending.
///
/// The sort is stable, so equal confidences keep their input order.
fn confidence_order(detections: &[Detection]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..detections.len()).collect();
    indices.sort_by(|&a, &b| detections[b].confidence.total_cmp(&detections[a].confidence));
    indices
}

/// Apply Non-Maximum Suppression to a set of detections
///
/// Detections are visited in order of decreasing confidence; a detection is
/// kept only if its `IoU` with every previously kept detection is below
/// `iou_threshold`.
///
/// # Arguments
///
/// * `detections` - Detections with bboxes and confidences
/// * `iou_threshold` - `IoU` threshold for suppression (0.0 to 1.0)
///
/// # Returns
///
/// Boolean mask, aligned with the input, indicating which detections to keep
///
/// # Errors
///
/// Returns error if `iou_threshold` is not in range [0.0, 1.0]
///
/// # Examples
///
/// ```
/// # use detection_eval::nms::non_maximum_suppression;
/// # use detection_eval::types::{BoundingBox, Detection};
/// let detections = vec![
///     Detection::new(BoundingBox::new(10.0, 10.0, 50.0, 50.0), 0.9),
///     Detection::new(BoundingBox::new(15.0, 15.0, 55.0, 55.0), 0.8),
///     Detection::new(BoundingBox::new(100.0, 100.0, 150.0, 150.0), 0.95),
/// ];
///
/// let keep_mask = non_maximum_suppression(&detections, 0.5).unwrap();
/// assert_eq!(keep_mask, vec![true, false, true]);
/// ```
pub fn non_maximum_suppression(detections: &[Detection], iou_threshold: f64) -> Result<Vec<bool>> {
    validate_threshold(iou_threshold)?;

    let mut keep_mask = vec![false; detections.len()];
    let mut kept: Vec<usize> = Vec::new();

    for idx in confidence_order(detections) {
        let bbox = &detections[idx].bbox;
        let suppressed = kept
            .iter()
            .any(|&k| calculate_iou(&detections[k].bbox, bbox) >= iou_threshold);

        if !suppressed {
            keep_mask[idx] = true;
            kept.push(idx);
        }
    }

    Ok(keep_mask)
}

/// Apply `NMS` and return the surviving detections, highest confidence first
pub fn suppress(detections: &[Detection], iou_threshold: f64) -> Result<Vec<Detection>> {
    let keep_mask = non_maximum_suppression(detections, iou_threshold)?;

    Ok(confidence_order(detections)
        .into_iter()
        .filter(|&idx| keep_mask[idx])
        .map(|idx| detections[idx])
        .collect())
}
