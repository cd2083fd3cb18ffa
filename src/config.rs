//! Evaluation and post-processing configuration.
//!
//! Values are owned by the caller (the `validate` binary reads them from its
//! arguments and environment) and passed explicitly into the core.

use serde::{Deserialize, Serialize};

use crate::error::{DetectionEvalError, Result};
use crate::threshold::validate_threshold;

/// Default minimum confidence for a detection to survive post-processing.
pub const DEFAULT_CONF_THRESHOLD: f64 = 0.25;
/// Default IoU above which NMS suppresses the lower-confidence box.
pub const DEFAULT_NMS_IOU_THRESHOLD: f64 = 0.45;
/// Default square inference resolution of the detector.
pub const DEFAULT_IMG_SIZE: u32 = 640;
/// Default IoU required for a prediction to match a ground truth box.
pub const DEFAULT_EVAL_IOU_THRESHOLD: f64 = 0.5;

/// Settings for turning raw detector output into final detections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub conf_threshold: f64,
    /// NMS IoU threshold, independent from the evaluation IoU threshold
    pub iou_threshold: f64,
    pub img_size: u32,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_NMS_IOU_THRESHOLD,
            img_size: DEFAULT_IMG_SIZE,
        }
    }
}

impl PostprocessConfig {
    /// Check thresholds are in [0, 1] and the inference size is non-zero.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.conf_threshold)?;
        validate_threshold(self.iou_threshold)?;
        if self.img_size == 0 {
            return Err(DetectionEvalError::InvalidConfig(
                "img_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for matching predictions against ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub iou_threshold: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_EVAL_IOU_THRESHOLD,
        }
    }
}

impl EvalConfig {
    pub fn new(iou_threshold: f64) -> Self {
        Self { iou_threshold }
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.iou_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let post = PostprocessConfig::default();
        assert_eq!(post.conf_threshold, 0.25);
        assert_eq!(post.iou_threshold, 0.45);
        assert_eq!(post.img_size, 640);
        assert_eq!(EvalConfig::default().iou_threshold, 0.5);
    }

    #[test]
    fn test_validate() {
        assert!(PostprocessConfig::default().validate().is_ok());
        assert!(EvalConfig::default().validate().is_ok());

        let bad_size = PostprocessConfig { img_size: 0, ..Default::default() };
        assert!(matches!(bad_size.validate(), Err(DetectionEvalError::InvalidConfig(_))));

        let bad_conf = PostprocessConfig { conf_threshold: 1.5, ..Default::default() };
        assert!(matches!(bad_conf.validate(), Err(DetectionEvalError::InvalidThreshold(_))));

        assert!(EvalConfig::new(-0.1).validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let post: PostprocessConfig = serde_json::from_str(r#"{"img_size": 1280}"#).unwrap();
        assert_eq!(post.img_size, 1280);
        assert_eq!(post.conf_threshold, DEFAULT_CONF_THRESHOLD);
    }
}
