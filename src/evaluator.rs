//! Main evaluation orchestrator: per-image matching and dataset aggregation.
//!
//! Images are matched in parallel with rayon; the per-image outcomes are then
//! folded into a single [`Aggregator`] on the calling thread, in input order.

use std::path::Path;

use rayon::prelude::*;

use crate::config::{EvalConfig, PostprocessConfig};
use crate::error::{DetectionEvalError, Result};
use crate::labels::{denormalize_labels, load_yolo_labels, validate_detections};
use crate::loader::{ImagePredictions, PredictionsFile};
use crate::matching::match_image;
use crate::metrics::f1_score::calculate_f1_score;
use crate::metrics::precision_recall::{calculate_precision, calculate_recall};
use crate::postprocess::postprocess;
use crate::stats::EvaluationWarnings;
use crate::types::{AggregateMetrics, ImageRecord, MatchOutcome};

/// Running TP/FP/FN totals over a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregator {
    iou_threshold: f64,
    images: usize,
    tp: usize,
    fp: usize,
    fn_: usize,
    warnings: EvaluationWarnings,
}

impl Aggregator {
    /// Create an empty aggregator for a run at `iou_threshold`.
    pub fn new(iou_threshold: f64) -> Self {
        Self {
            iou_threshold,
            ..Default::default()
        }
    }

    /// Add one image's counts to the totals.
    pub fn accumulate(&mut self, outcome: &MatchOutcome) {
        self.images += 1;
        self.tp += outcome.tp;
        self.fp += outcome.fp;
        self.fn_ += outcome.fn_;
    }

    /// Count an image that was excluded from the totals.
    pub fn record_skip(&mut self, error: &DetectionEvalError) {
        self.warnings.record(error);
    }

    /// Fold another partial aggregator into this one.
    pub fn merge(&mut self, other: &Aggregator) {
        self.images += other.images;
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.warnings.merge(&other.warnings);
    }

    pub fn images(&self) -> usize {
        self.images
    }

    /// Compute precision, recall and F1 from the current totals.
    ///
    /// This is a pure function of the accumulated state: calling it again
    /// without accumulating more yields an identical report. Zero denominators
    /// produce 0.0.
    pub fn finalize(&self) -> AggregateMetrics {
        let precision = calculate_precision(self.tp, self.fp);
        let recall = calculate_recall(self.tp, self.fn_);
        let f1 = calculate_f1_score(precision, recall);

        AggregateMetrics {
            images: self.images,
            tp: self.tp,
            fp: self.fp,
            fn_: self.fn_,
            precision,
            recall,
            f1,
            iou_threshold: self.iou_threshold,
            warnings: self.warnings,
        }
    }
}

/// Evaluate already-prepared image records.
///
/// # Arguments
///
/// * `records` - One record per image
/// * `config` - Evaluation IoU threshold
///
/// # Errors
///
/// Returns an error only if the configuration is invalid.
///
/// # Example
///
/// ```
/// use detection_eval::config::EvalConfig;
/// use detection_eval::evaluator::evaluate;
/// use detection_eval::types::{BoundingBox, Detection, GroundTruthBox, ImageRecord};
///
/// let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// let records = vec![ImageRecord::new(vec![Detection::new(bbox, 0.9)], vec![GroundTruthBox::new(bbox)])];
/// let metrics = evaluate(&records, &EvalConfig::default()).unwrap();
/// assert_eq!(metrics.tp, 1);
/// assert_eq!(metrics.f1, 1.0);
/// ```
pub fn evaluate(records: &[ImageRecord], config: &EvalConfig) -> Result<AggregateMetrics> {
    config.validate()?;

    let outcomes: Vec<MatchOutcome> = records
        .par_iter()
        .map(|record| match_image(record, config.iou_threshold))
        .collect();

    let mut aggregator = Aggregator::new(config.iou_threshold);
    for outcome in &outcomes {
        aggregator.accumulate(outcome);
    }

    Ok(aggregator.finalize())
}

/// An image ready for evaluation, or the reason it cannot be evaluated.
#[derive(Debug)]
pub struct ImageEntry {
    pub name: String,
    pub record: Result<ImageRecord>,
}

/// Evaluate images whose preparation may have failed.
///
/// Failed images are logged, excluded from the totals and counted in the
/// report's warnings; they never abort the run.
///
/// # Errors
///
/// Returns an error only if the configuration is invalid.
pub fn evaluate_entries(entries: &[ImageEntry], config: &EvalConfig) -> Result<AggregateMetrics> {
    config.validate()?;

    let outcomes: Vec<std::result::Result<MatchOutcome, &DetectionEvalError>> = entries
        .par_iter()
        .map(|entry| {
            entry
                .record
                .as_ref()
                .map(|record| match_image(record, config.iou_threshold))
        })
        .collect();

    let mut aggregator = Aggregator::new(config.iou_threshold);
    for (entry, outcome) in entries.iter().zip(&outcomes) {
        match outcome {
            Ok(outcome) => {
                log::debug!(
                    "{}: tp={} fp={} fn={}",
                    entry.name,
                    outcome.tp,
                    outcome.fp,
                    outcome.fn_
                );
                aggregator.accumulate(outcome);
            }
            Err(err) => {
                log::warn!("skipping {}: {}", entry.name, err);
                aggregator.record_skip(err);
            }
        }
    }

    let metrics = aggregator.finalize();
    log::info!(
        "evaluated {} images (skipped {}): precision={:.3} recall={:.3} f1={:.3} at iou {:.2}",
        metrics.images,
        metrics.warnings.total(),
        metrics.precision,
        metrics.recall,
        metrics.f1,
        metrics.iou_threshold
    );
    if metrics.warnings.total() > 0 {
        log::warn!("{}", metrics.warnings.summary_string());
    }

    Ok(metrics)
}

/// Build the record for one image: decode its detections, optionally
/// post-process them, and adapt its label file.
pub fn prepare_image(
    image: &ImagePredictions,
    labels_dir: &Path,
    postprocess_config: Option<&PostprocessConfig>,
) -> Result<ImageRecord> {
    if image.width == 0 || image.height == 0 {
        return Err(DetectionEvalError::InvalidImageDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let detections = image.detections()?;
    validate_detections(&detections)?;
    let predictions = match postprocess_config {
        Some(config) => postprocess(&detections, config, image.width, image.height)?,
        None => detections,
    };

    let labels = load_yolo_labels(image.label_path(labels_dir))?;
    let ground_truths = denormalize_labels(&labels, image.width, image.height)?;

    Ok(ImageRecord::new(predictions, ground_truths))
}

/// Prepare every image of a predictions file, keeping errors per image.
///
/// # Errors
///
/// Returns an error only if `postprocess_config` is invalid.
pub fn prepare_images(
    predictions: &PredictionsFile,
    labels_dir: &Path,
    postprocess_config: Option<&PostprocessConfig>,
) -> Result<Vec<ImageEntry>> {
    if let Some(config) = postprocess_config {
        config.validate()?;
    }

    Ok(predictions
        .images
        .par_iter()
        .map(|image| ImageEntry {
            name: image.file_name.clone(),
            record: prepare_image(image, labels_dir, postprocess_config),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Detection, GroundTruthBox};

    fn square(offset: f64) -> BoundingBox {
        BoundingBox::new(offset, offset, offset + 10.0, offset + 10.0)
    }

    #[test]
    fn test_aggregator_empty() {
        let metrics = Aggregator::new(0.5).finalize();
        assert_eq!(metrics.images, 0);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.iou_threshold, 0.5);
    }

    #[test]
    fn test_aggregator_totals() {
        let mut aggregator = Aggregator::new(0.5);
        aggregator.accumulate(&MatchOutcome::new(1, 0, 0));
        aggregator.accumulate(&MatchOutcome::new(0, 1, 1));
        aggregator.accumulate(&MatchOutcome::new(2, 0, 1));

        let metrics = aggregator.finalize();
        assert_eq!((metrics.images, metrics.tp, metrics.fp, metrics.fn_), (3, 3, 1, 2));
        assert!((metrics.precision - 0.75).abs() < 1e-10);
        assert!((metrics.recall - 0.6).abs() < 1e-10);
        assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut aggregator = Aggregator::new(0.5);
        aggregator.accumulate(&MatchOutcome::new(4, 1, 3));
        assert_eq!(aggregator.finalize(), aggregator.finalize());
    }

    #[test]
    fn test_merge_matches_sequential() {
        let outcomes = [
            MatchOutcome::new(1, 2, 3),
            MatchOutcome::new(4, 0, 1),
            MatchOutcome::new(0, 0, 2),
        ];

        let mut all = Aggregator::new(0.5);
        outcomes.iter().for_each(|o| all.accumulate(o));

        let mut left = Aggregator::new(0.5);
        left.accumulate(&outcomes[0]);
        let mut right = Aggregator::new(0.5);
        right.accumulate(&outcomes[1]);
        right.accumulate(&outcomes[2]);
        right.record_skip(&DetectionEvalError::MalformedAnnotation("x".into()));
        left.merge(&right);

        assert_eq!(left.images(), 3);
        assert_eq!(left.finalize().tp, all.finalize().tp);
        assert_eq!(left.finalize().warnings.malformed_annotations, 1);
    }

    #[test]
    fn test_evaluate_records() {
        let records = vec![
            ImageRecord::new(
                vec![Detection::new(square(0.0), 0.9)],
                vec![GroundTruthBox::new(square(0.0))],
            ),
            ImageRecord::new(
                vec![Detection::new(square(0.0), 0.9)],
                vec![GroundTruthBox::new(square(50.0))],
            ),
        ];

        let metrics = evaluate(&records, &EvalConfig::default()).unwrap();
        assert_eq!((metrics.tp, metrics.fp, metrics.fn_), (1, 1, 1));
        assert_eq!(metrics.images, 2);
    }

    #[test]
    fn test_evaluate_rejects_invalid_threshold() {
        assert!(evaluate(&[], &EvalConfig::new(2.0)).is_err());
    }

    #[test]
    fn test_entries_skip_errors() {
        let entries = vec![
            ImageEntry {
                name: "good.jpg".into(),
                record: Ok(ImageRecord::new(
                    vec![Detection::new(square(0.0), 0.9)],
                    vec![GroundTruthBox::new(square(0.0))],
                )),
            },
            ImageEntry {
                name: "zero.jpg".into(),
                record: Err(DetectionEvalError::InvalidImageDimensions { width: 0, height: 0 }),
            },
            ImageEntry {
                name: "bad.jpg".into(),
                record: Err(DetectionEvalError::MalformedAnnotation("line 1".into())),
            },
        ];

        let metrics = evaluate_entries(&entries, &EvalConfig::default()).unwrap();
        assert_eq!(metrics.images, 1);
        assert_eq!(metrics.tp, 1);
        assert_eq!(metrics.warnings.invalid_image_dimensions, 1);
        assert_eq!(metrics.warnings.malformed_annotations, 1);
    }

    #[test]
    fn test_prepare_image_zero_dimensions() {
        let image = ImagePredictions::new("a.jpg", 0, 480, &[]).unwrap();
        let result = prepare_image(&image, Path::new("/nonexistent"), None);
        assert!(matches!(result, Err(DetectionEvalError::InvalidImageDimensions { .. })));
    }

    #[test]
    fn test_prepare_image_without_labels() {
        let dets = vec![Detection::new(square(0.0), 0.9)];
        let image = ImagePredictions::new("a.jpg", 640, 480, &dets).unwrap();
        let record = prepare_image(&image, Path::new("/nonexistent"), None).unwrap();
        assert_eq!(record.predictions.len(), 1);
        assert!(record.ground_truths.is_empty());
    }
}
