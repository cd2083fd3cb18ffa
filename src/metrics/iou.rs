//! Intersection over Union (IoU) calculation.
//!
//! Shared by the matcher and by non-maximum suppression.

use crate::types::BoundingBox;

/// Calculate the area of overlap between two bounding boxes.
///
/// Returns 0.0 when the overlap rectangle is degenerate (zero or negative
/// width or height).
///
/// # Example
///
/// ```
/// use detection_eval::metrics::iou::intersection_area;
/// use detection_eval::types::BoundingBox;
///
/// let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
/// assert_eq!(intersection_area(&a, &b), 25.0);
/// ```
pub fn intersection_area(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let overlap = BoundingBox::new(
        bbox1.x_min.max(bbox2.x_min),
        bbox1.y_min.max(bbox2.y_min),
        bbox1.x_max.min(bbox2.x_max),
        bbox1.y_max.min(bbox2.y_max),
    );

    // area() clamps negative extents to zero
    overlap.area()
}

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// IoU is defined as the area of intersection divided by the area of union.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap), never
/// NaN. Two zero-area boxes have an IoU of 0.0, as do boxes with non-finite
/// coordinates.
///
/// # Example
///
/// ```
/// use detection_eval::metrics::iou::calculate_iou;
/// use detection_eval::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// let bbox2 = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let intersection = intersection_area(bbox1, bbox2);
    let union_area = bbox1.area() + bbox2.area() - intersection;

    // NaN unions come from infinite coordinates
    if !(union_area > 0.0 && union_area.is_finite()) {
        return 0.0;
    }

    let iou = intersection / union_area;
    if iou.is_nan() {
        return 0.0;
    }
    iou.clamp(0.0, 1.0)
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// # Returns
///
/// Returns a 2D vector where `result[i][j]` is the IoU between `bboxes1[i]` and `bboxes2[j]`.
///
/// # Example
///
/// ```
/// use detection_eval::metrics::iou::calculate_iou_matrix;
/// use detection_eval::types::BoundingBox;
///
/// let bboxes1 = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
/// let bboxes2 = vec![BoundingBox::new(5.0, 5.0, 15.0, 15.0)];
/// let iou_matrix = calculate_iou_matrix(&bboxes1, &bboxes2);
/// assert_eq!(iou_matrix.len(), 1);
/// assert_eq!(iou_matrix[0].len(), 1);
/// ```
pub fn calculate_iou_matrix(bboxes1: &[BoundingBox], bboxes2: &[BoundingBox]) -> Vec<Vec<f64>> {
    bboxes1
        .iter()
        .map(|bbox1| {
            bboxes2
                .iter()
                .map(|bbox2| calculate_iou(bbox1, bbox2))
                .collect()
        })
        .collect()
}
