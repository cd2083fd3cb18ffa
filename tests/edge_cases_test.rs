//! Comprehensive edge case and boundary condition tests.

use detection_eval::config::EvalConfig;
use detection_eval::evaluator::evaluate;
use detection_eval::labels::{denormalize_labels, parse_yolo_labels, YoloLabel};
use detection_eval::matching::{match_boxes, match_detections};
use detection_eval::metrics::calculate_iou;
use detection_eval::response::DetectionResponse;
use detection_eval::types::{BoundingBox, Detection, GroundTruthBox, ImageRecord, MatchOutcome};

fn bbox(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> BoundingBox {
    BoundingBox::new(x_min, y_min, x_max, y_max)
}

// ============================================================================
// MATCHING EDGE CASES
// ============================================================================

#[test]
fn test_empty_predictions_with_ground_truth() {
    let gts = vec![bbox(10.0, 10.0, 60.0, 60.0), bbox(100.0, 100.0, 150.0, 150.0)];
    assert_eq!(match_boxes(&[], &gts, 0.5), MatchOutcome::new(0, 0, 2));
}

#[test]
fn test_empty_ground_truth_with_predictions() {
    let preds = vec![bbox(10.0, 10.0, 60.0, 60.0)];
    assert_eq!(match_boxes(&preds, &[], 0.5), MatchOutcome::new(0, 1, 0));
}

#[test]
fn test_many_predictions_one_ground_truth() {
    let gts = vec![bbox(50.0, 50.0, 150.0, 150.0)];
    let preds: Vec<BoundingBox> = (0..10)
        .map(|i| {
            let shift = i as f64;
            bbox(50.0 + shift, 50.0, 150.0 + shift, 150.0)
        })
        .collect();

    let outcome = match_boxes(&preds, &gts, 0.5);
    assert_eq!(outcome, MatchOutcome::new(1, 9, 0));

    let matches = match_detections(&preds, &gts, 0.5);
    assert_eq!(matches[0].prediction_index, 0, "unshifted box has the highest IoU");
}

#[test]
fn test_one_prediction_many_ground_truths() {
    let preds = vec![bbox(0.0, 0.0, 10.0, 10.0)];
    let gts = vec![
        bbox(1.0, 0.0, 11.0, 10.0),
        bbox(0.0, 0.0, 10.0, 10.0),
        bbox(2.0, 0.0, 12.0, 10.0),
    ];

    let matches = match_detections(&preds, &gts, 0.5);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].ground_truth_index, 1);
    assert_eq!(match_boxes(&preds, &gts, 0.5), MatchOutcome::new(1, 0, 2));
}

#[test]
fn test_identical_ground_truths() {
    // duplicate labels: two identical predictions consume both, in index order
    let gts = vec![bbox(0.0, 0.0, 10.0, 10.0), bbox(0.0, 0.0, 10.0, 10.0)];
    let preds = vec![bbox(0.0, 0.0, 10.0, 10.0), bbox(0.0, 0.0, 10.0, 10.0)];

    let matches = match_detections(&preds, &gts, 0.5);
    assert_eq!(matches.len(), 2);
    assert_eq!((matches[0].prediction_index, matches[0].ground_truth_index), (0, 0));
    assert_eq!((matches[1].prediction_index, matches[1].ground_truth_index), (1, 1));
}

#[test]
fn test_nested_ground_truths() {
    // the inner box is fully inside the outer one
    let outer = bbox(0.0, 0.0, 20.0, 20.0);
    let inner = bbox(0.0, 0.0, 20.0, 15.0); // IoU with outer = 0.75
    let gts = vec![outer, inner];
    let preds = vec![inner];

    let matches = match_detections(&preds, &gts, 0.5);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].ground_truth_index, 1, "exact match beats the enclosing box");
}

#[test]
fn test_iou_exactly_at_threshold_matches() {
    let gts = vec![bbox(0.0, 0.0, 10.0, 10.0)];
    let preds = vec![bbox(0.0, 0.0, 5.0, 10.0)]; // IoU 0.5
    assert_eq!(match_boxes(&preds, &gts, 0.5), MatchOutcome::new(1, 0, 0));
    assert_eq!(match_boxes(&preds, &gts, 0.5001), MatchOutcome::new(0, 1, 1));
}

#[test]
fn test_threshold_one_requires_exact_overlap() {
    let gts = vec![bbox(0.0, 0.0, 10.0, 10.0)];
    assert_eq!(match_boxes(&gts, &gts, 1.0), MatchOutcome::new(1, 0, 0));
    assert_eq!(
        match_boxes(&[bbox(0.0, 0.0, 10.0, 9.99)], &gts, 1.0),
        MatchOutcome::new(0, 1, 1)
    );
}

#[test]
fn test_degenerate_boxes_never_match() {
    let point = bbox(5.0, 5.0, 5.0, 5.0);
    assert_eq!(calculate_iou(&point, &point), 0.0);
    assert_eq!(match_boxes(&[point], &[point], 0.0), MatchOutcome::new(0, 1, 1));
}

#[test]
fn test_very_small_boxes() {
    let a = bbox(0.0, 0.0, 0.001, 0.001);
    let iou = calculate_iou(&a, &a);
    assert!((iou - 1.0).abs() < 1e-9);
}

#[test]
fn test_large_coordinates() {
    let a = bbox(1e6, 1e6, 1e6 + 100.0, 1e6 + 100.0);
    let b = bbox(1e6 + 50.0, 1e6, 1e6 + 150.0, 1e6 + 100.0);
    // 50x100 / (2*100*100 - 50*100)
    assert!((calculate_iou(&a, &b) - 5000.0 / 15000.0).abs() < 1e-9);
}

// ============================================================================
// DATASET EDGE CASES
// ============================================================================

#[test]
fn test_no_images() {
    let metrics = evaluate(&[], &EvalConfig::default()).unwrap();
    assert_eq!(metrics.images, 0);
    assert_eq!((metrics.precision, metrics.recall, metrics.f1), (0.0, 0.0, 0.0));
}

#[test]
fn test_images_without_boxes_count() {
    let records = vec![ImageRecord::default(); 5];
    let metrics = evaluate(&records, &EvalConfig::default()).unwrap();
    assert_eq!(metrics.images, 5);
    assert_eq!((metrics.tp, metrics.fp, metrics.fn_), (0, 0, 0));
    assert_eq!(metrics.f1, 0.0);
}

#[test]
fn test_only_false_negatives() {
    let records = vec![ImageRecord::new(
        vec![],
        vec![GroundTruthBox::new(bbox(0.0, 0.0, 10.0, 10.0))],
    )];
    let metrics = evaluate(&records, &EvalConfig::default()).unwrap();
    assert_eq!(metrics.precision, 0.0);
    assert_eq!(metrics.recall, 0.0);
    assert_eq!(metrics.f1, 0.0);
}

#[test]
fn test_perfect_precision_partial_recall() {
    let records = vec![ImageRecord::new(
        vec![Detection::new(bbox(0.0, 0.0, 10.0, 10.0), 0.9)],
        vec![
            GroundTruthBox::new(bbox(0.0, 0.0, 10.0, 10.0)),
            GroundTruthBox::new(bbox(50.0, 50.0, 60.0, 60.0)),
        ],
    )];
    let metrics = evaluate(&records, &EvalConfig::default()).unwrap();
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 0.5);
    assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-10);
}

// ============================================================================
// LABEL ADAPTER EDGE CASES
// ============================================================================

#[test]
fn test_label_out_of_range_is_clamped() {
    let labels = parse_yolo_labels("0 1.125 -0.125 0.5 0.5\n").unwrap();
    let gts = denormalize_labels(&labels, 100, 100).unwrap();
    let b = gts[0].bbox;
    assert_eq!(b, bbox(87.5, 0.0, 100.0, 12.5));
    assert!(b.x_min >= 0.0 && b.y_min >= 0.0 && b.x_max <= 100.0 && b.y_max <= 100.0);
}

#[test]
fn test_label_fully_outside_image_is_empty() {
    let label = YoloLabel { class_id: Some(0), center_x: 2.0, center_y: 2.0, width: 0.1, height: 0.1 };
    let b = label.to_bounding_box(100, 50).unwrap();
    assert_eq!(b, bbox(100.0, 50.0, 100.0, 50.0));
    assert_eq!(b.area(), 0.0);
}

#[test]
fn test_label_whole_image() {
    let labels = parse_yolo_labels("7 0.5 0.5 1.0 1.0").unwrap();
    let gts = denormalize_labels(&labels, 1920, 1080).unwrap();
    assert_eq!(gts[0].bbox, bbox(0.0, 0.0, 1920.0, 1080.0));
}

#[test]
fn test_label_windows_line_endings() {
    let labels = parse_yolo_labels("0 0.5 0.5 0.2 0.2\r\n1 0.5 0.5 0.2 0.2\r\n").unwrap();
    assert_eq!(labels.len(), 2);
}

// ============================================================================
// RESPONSE CONTRACT
// ============================================================================

#[test]
fn test_response_boxes_evaluate_like_detections() {
    let dets = vec![Detection::new(bbox(10.4, 10.6, 50.2, 50.9), 0.9)];
    let response = DetectionResponse::from_detections(&dets, 100, 100).unwrap();
    let gts = vec![bbox(10.0, 10.0, 50.0, 50.0)];
    assert_eq!(match_boxes(&response.boxes(), &gts, 0.5), MatchOutcome::new(1, 0, 0));
}
