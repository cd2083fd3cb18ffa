//! Detector post-processing: confidence filtering, NMS and rescaling.
//!
//! The detector reports boxes at its square inference resolution
//! (`img_size x img_size`); this pipeline turns them into final detections in
//! the original image's pixel space.

use crate::config::PostprocessConfig;
use crate::error::{DetectionEvalError, Result};
use crate::nms::suppress;
use crate::threshold::filter_by_confidence;
use crate::types::Detection;

/// Map a detection from inference resolution back to the original image.
///
/// Each axis is scaled independently, then the box is clamped into
/// `[0, width] x [0, height]`.
pub fn scale_to_original(detection: &Detection, img_size: u32, width: u32, height: u32) -> Result<Detection> {
    if width == 0 || height == 0 {
        return Err(DetectionEvalError::InvalidImageDimensions { width, height });
    }
    if img_size == 0 {
        return Err(DetectionEvalError::InvalidConfig(
            "img_size must be greater than 0".to_string(),
        ));
    }

    let sx = f64::from(width) / f64::from(img_size);
    let sy = f64::from(height) / f64::from(img_size);
    let bbox = detection
        .bbox
        .scale(sx, sy)
        .clamp_to(f64::from(width), f64::from(height));

    Ok(Detection::new(bbox, detection.confidence))
}

/// Run the full post-processing pipeline for one image.
///
/// # Arguments
///
/// * `raw` - Detector output at inference resolution
/// * `config` - Confidence threshold, NMS IoU threshold and inference size
/// * `width`, `height` - Original image size in pixels
///
/// # Returns
///
/// Surviving detections in original pixel coordinates, highest confidence first.
///
/// # Example
///
/// ```
/// use detection_eval::config::PostprocessConfig;
/// use detection_eval::postprocess::postprocess;
/// use detection_eval::types::{BoundingBox, Detection};
///
/// let raw = vec![
///     Detection::new(BoundingBox::new(0.0, 0.0, 320.0, 320.0), 0.9),
///     Detection::new(BoundingBox::new(0.0, 0.0, 320.0, 320.0), 0.1),
/// ];
/// let dets = postprocess(&raw, &PostprocessConfig::default(), 1280, 480).unwrap();
/// assert_eq!(dets.len(), 1);
/// assert_eq!(dets[0].bbox, BoundingBox::new(0.0, 0.0, 640.0, 240.0));
/// ```
pub fn postprocess(
    raw: &[Detection],
    config: &PostprocessConfig,
    width: u32,
    height: u32,
) -> Result<Vec<Detection>> {
    config.validate()?;
    if width == 0 || height == 0 {
        return Err(DetectionEvalError::InvalidImageDimensions { width, height });
    }

    let confident = filter_by_confidence(raw, config.conf_threshold)?;
    let kept = suppress(&confident, config.iou_threshold)?;

    log::debug!(
        "postprocess: {} raw, {} above conf {:.2}, {} after nms {:.2}",
        raw.len(),
        confident.len(),
        config.conf_threshold,
        kept.len(),
        config.iou_threshold
    );

    kept.iter()
        .map(|det| scale_to_original(det, config.img_size, width, height))
        .collect()
}
