//! # detection-eval
//!
//! Scores an object detector's output against hand-labeled ground truth.
//!
//! This library provides:
//! - **IoU** between axis-aligned boxes and pairwise IoU matrices
//! - **Greedy matching** of predictions to ground truth (highest IoU first,
//!   one-to-one, deterministic tie-break)
//! - **Precision**, **Recall** and **F1** aggregated over a dataset
//! - **Post-processing** of raw detector output: confidence filtering,
//!   non-maximum suppression and rescaling to the original image size
//! - Adapters for YOLO-format label files and the detection service's
//!   response body
//!
//! ## Quick Start
//!
//! ```rust
//! use detection_eval::config::EvalConfig;
//! use detection_eval::evaluator::evaluate;
//! use detection_eval::labels::{denormalize_labels, parse_yolo_labels};
//! use detection_eval::types::{BoundingBox, Detection, ImageRecord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let labels = parse_yolo_labels("0 0.5 0.5 0.5 0.5")?;
//! let ground_truths = denormalize_labels(&labels, 200, 100)?;
//! let predictions = vec![Detection::new(BoundingBox::new(50.0, 25.0, 150.0, 75.0), 0.9)];
//!
//! let records = vec![ImageRecord::new(predictions, ground_truths)];
//! let metrics = evaluate(&records, &EvalConfig::default())?;
//!
//! println!("precision: {:.3}", metrics.precision);
//! println!("recall: {:.3}", metrics.recall);
//! println!("f1: {:.3}", metrics.f1);
//! # assert_eq!(metrics.tp, 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod stats;
pub mod metrics;
pub mod matching;
pub mod threshold;
pub mod nms;
pub mod postprocess;
pub mod labels;
pub mod loader;
pub mod response;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{DetectionEvalError, Result};
pub use types::{
    AggregateMetrics, BoundingBox, Detection, GroundTruthBox, ImageRecord, MatchOutcome,
};
pub use config::{EvalConfig, PostprocessConfig};
pub use evaluator::{evaluate, evaluate_entries, Aggregator};
pub use matching::{match_boxes, match_image};
pub use postprocess::postprocess;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_compiles() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.is_valid());
    }
}
