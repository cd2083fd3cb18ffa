//! Basic evaluation example demonstrating core functionality.

use detection_eval::{
    config::{EvalConfig, PostprocessConfig},
    evaluator::{evaluate_entries, prepare_images},
    labels::{denormalize_labels, parse_yolo_labels},
    loader::load_predictions_from_string,
    matching::match_detections,
    metrics::iou::calculate_iou,
    postprocess::postprocess,
    response::DetectionResponse,
    BoundingBox, Detection,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Detection Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
    let bbox2 = BoundingBox::new(30.0, 30.0, 70.0, 70.0);
    let iou = calculate_iou(&bbox1, &bbox2);
    println!("   IoU between overlapping boxes: {:.4}", iou);
    println!();

    // Example 2: YOLO labels
    println!("2. Reading YOLO Labels");
    let label_text = "0 0.25 0.40 0.20 0.30\n1 0.70 0.55 0.15 0.25\n";
    let labels = parse_yolo_labels(label_text)?;
    let ground_truths = denormalize_labels(&labels, 640, 480)?;
    println!("   Parsed {} labels", labels.len());
    for (label, gt) in labels.iter().zip(&ground_truths) {
        println!(
            "   ├─ class {:?} -> ({:.1}, {:.1}, {:.1}, {:.1})",
            label.class_id, gt.bbox.x_min, gt.bbox.y_min, gt.bbox.x_max, gt.bbox.y_max
        );
    }
    println!();

    // Example 3: Post-processing raw detector output
    println!("3. Post-processing (640x640 model input -> 640x480 image)");
    let raw = vec![
        Detection::new(BoundingBox::new(97.0, 208.0, 225.0, 394.0), 0.91),
        Detection::new(BoundingBox::new(99.0, 210.0, 227.0, 396.0), 0.84),
        Detection::new(BoundingBox::new(400.0, 283.0, 496.0, 453.0), 0.77),
        Detection::new(BoundingBox::new(10.0, 10.0, 40.0, 40.0), 0.12),
    ];
    let config = PostprocessConfig::default();
    let detections = postprocess(&raw, &config, 640, 480)?;
    println!(
        "   {} raw detections -> {} after confidence >= {} and NMS @ {}",
        raw.len(),
        detections.len(),
        config.conf_threshold,
        config.iou_threshold
    );

    let response = DetectionResponse::from_detections(&detections, 640, 480)?;
    println!("   Service response: {}", serde_json::to_string(&response)?);
    println!();

    // Example 4: Matching
    println!("4. Greedy Matching");
    let pred_boxes: Vec<BoundingBox> = detections.iter().map(|d| d.bbox).collect();
    let gt_boxes: Vec<BoundingBox> = ground_truths.iter().map(|g| g.bbox).collect();
    for m in match_detections(&pred_boxes, &gt_boxes, 0.5) {
        println!(
            "   ├─ prediction {} <-> ground truth {} (IoU {:.4})",
            m.prediction_index, m.ground_truth_index, m.iou
        );
    }
    println!();

    // Example 5: Dataset evaluation from a predictions document
    println!("5. Running Full Evaluation");
    let labels_dir = std::env::temp_dir().join("detection_eval_demo_labels");
    std::fs::create_dir_all(&labels_dir)?;
    std::fs::write(labels_dir.join("street.txt"), label_text)?;

    let predictions_json = r#"{
        "images": [
            {
                "file_name": "street.jpg",
                "width": 640,
                "height": 480,
                "detections": [
                    {"bbox": {"x_min": 97.0, "y_min": 120.0, "x_max": 225.0, "y_max": 264.0}, "confidence": 0.91},
                    {"bbox": {"x_min": 400.0, "y_min": 200.0, "x_max": 496.0, "y_max": 320.0}, "confidence": 0.77},
                    {"bbox": {"x_min": 10.0, "y_min": 10.0, "x_max": 40.0, "y_max": 40.0}, "confidence": 0.30}
                ]
            },
            {
                "file_name": "broken.jpg",
                "width": 0,
                "height": 480
            }
        ]
    }"#;
    let predictions = load_predictions_from_string(predictions_json)?;
    let entries = prepare_images(&predictions, &labels_dir, None)?;
    let metrics = evaluate_entries(&entries, &EvalConfig::default())?;

    println!("   Evaluation complete!");
    println!();
    println!("   Overall Metrics:");
    println!("   ├─ Images: {}", metrics.images);
    println!("   ├─ TP / FP / FN: {} / {} / {}", metrics.tp, metrics.fp, metrics.fn_);
    println!("   ├─ Precision: {:.4}", metrics.precision);
    println!("   ├─ Recall: {:.4}", metrics.recall);
    println!("   └─ F1 Score: {:.4}", metrics.f1);
    if metrics.warnings.total() > 0 {
        println!("   Skipped: {}", metrics.warnings.summary_string());
    }
    println!();

    // Example 6: Manual Precision/Recall calculation
    println!("6. Computing Precision and Recall (Manual Example)");
    use detection_eval::metrics::f1_score::calculate_f1_from_pr;
    use detection_eval::metrics::precision_recall::calculate_precision_recall;

    let pr = calculate_precision_recall(8, 2, 3);
    println!("   For TP=8, FP=2, FN=3:");
    println!("   ├─ Precision: {:.4} ({}/{})", pr.precision, pr.true_positives, pr.true_positives + pr.false_positives);
    println!("   ├─ Recall: {:.4} ({}/{})", pr.recall, pr.true_positives, pr.true_positives + pr.false_negatives);

    let f1 = calculate_f1_from_pr(&pr);
    println!("   └─ F1 Score: {:.4}", f1);
    println!();

    std::fs::remove_dir_all(&labels_dir)?;
    println!("=== Example Complete ===");

    Ok(())
}
