//! Core data types for detections, ground truth and evaluation results.

use serde::{Deserialize, Serialize};

use crate::error::{DetectionEvalError, Result};
use crate::stats::EvaluationWarnings;

/// Axis-aligned bounding box in absolute pixel coordinates.
///
/// Coordinates are in XYXY (corner) format:
/// - x_min, y_min: top-left corner
/// - x_max, y_max: bottom-right corner
///
/// Zero-area boxes are legal and behave as empty regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its corners.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self { x_min, y_min, x_max, y_max }
    }

    /// Create a bounding box, rejecting non-finite or inverted coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionEvalError::InvalidBoundingBox`] if any coordinate is
    /// NaN/infinite or if `x_min > x_max` or `y_min > y_max`.
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        let bbox = Self::new(x_min, y_min, x_max, y_max);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Width of the box, never negative.
    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).max(0.0)
    }

    /// Height of the box, never negative.
    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).max(0.0)
    }

    /// Area of the box.
    ///
    /// Malformed boxes (max below min) have an area of 0 rather than a
    /// negative one.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check that all coordinates are finite and correctly ordered.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<()> {
        let coords = [self.x_min, self.y_min, self.x_max, self.y_max];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(DetectionEvalError::InvalidBoundingBox(format!(
                "non-finite coordinates {coords:?}"
            )));
        }
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(DetectionEvalError::InvalidBoundingBox(format!(
                "inverted corners {coords:?}"
            )));
        }
        Ok(())
    }

    /// Scale each axis independently.
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(
            self.x_min * sx,
            self.y_min * sy,
            self.x_max * sx,
            self.y_max * sy,
        )
    }

    /// Clamp the box into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        Self::new(
            self.x_min.clamp(0.0, width),
            self.y_min.clamp(0.0, height),
            self.x_max.clamp(0.0, width),
            self.y_max.clamp(0.0, height),
        )
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// A box produced by the detector, with its confidence score.
///
/// The confidence only drives post-processing; matching ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Confidence score, 1.0 when the source did not report one
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl Detection {
    /// Create a new detection.
    pub fn new(bbox: BoundingBox, confidence: f64) -> Self {
        Self { bbox, confidence }
    }
}

/// A hand-labeled box for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthBox {
    pub bbox: BoundingBox,
}

impl GroundTruthBox {
    pub fn new(bbox: BoundingBox) -> Self {
        Self { bbox }
    }
}

/// Predictions and ground truth for a single image; the unit of evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRecord {
    pub predictions: Vec<Detection>,
    pub ground_truths: Vec<GroundTruthBox>,
}

impl ImageRecord {
    pub fn new(predictions: Vec<Detection>, ground_truths: Vec<GroundTruthBox>) -> Self {
        Self { predictions, ground_truths }
    }

    /// Prediction boxes in input order.
    pub fn prediction_boxes(&self) -> Vec<BoundingBox> {
        self.predictions.iter().map(|d| d.bbox).collect()
    }

    /// Ground-truth boxes in input order.
    pub fn ground_truth_boxes(&self) -> Vec<BoundingBox> {
        self.ground_truths.iter().map(|g| g.bbox).collect()
    }
}

/// Per-image matching counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl MatchOutcome {
    pub fn new(tp: usize, fp: usize, fn_: usize) -> Self {
        Self { tp, fp, fn_ }
    }
}

/// Dataset-level evaluation report.
///
/// Serializes as
/// `{"images":..,"tp":..,"fp":..,"fn":..,"precision":..,"recall":..,"f1":..,"iou_threshold":..,"warnings":{..}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Number of images that contributed to the totals
    pub images: usize,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// IoU threshold used for matching
    pub iou_threshold: f64,
    /// Images excluded from the totals, by reason
    #[serde(default)]
    pub warnings: EvaluationWarnings,
}

impl AggregateMetrics {
    /// Serialize the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
