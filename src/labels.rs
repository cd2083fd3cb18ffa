//! Ground-truth label adapter for YOLO-format annotation files.
//!
//! Each label file holds one box per line as
//! `class_id center_x center_y width height`, all but the class id normalized
//! to `[0, 1]` relative to the image size.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{DetectionEvalError, Result};
use crate::types::{BoundingBox, Detection, GroundTruthBox};

/// One normalized annotation line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloLabel {
    /// `None` when the class field is numeric but not a whole non-negative number
    pub class_id: Option<u32>,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloLabel {
    /// Convert to an absolute-pixel box for an image of `width x height`.
    ///
    /// The result is clamped into `[0, width] x [0, height]`, so labels that
    /// reach past the image border never produce negative or overflowing
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionEvalError::InvalidImageDimensions`] if either
    /// dimension is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use detection_eval::labels::YoloLabel;
    /// use detection_eval::types::BoundingBox;
    ///
    /// let label = YoloLabel { class_id: Some(0), center_x: 0.5, center_y: 0.5, width: 0.5, height: 0.25 };
    /// let bbox = label.to_bounding_box(200, 100).unwrap();
    /// assert_eq!(bbox, BoundingBox::new(50.0, 37.5, 150.0, 62.5));
    /// ```
    pub fn to_bounding_box(&self, image_width: u32, image_height: u32) -> Result<BoundingBox> {
        if image_width == 0 || image_height == 0 {
            return Err(DetectionEvalError::InvalidImageDimensions {
                width: image_width,
                height: image_height,
            });
        }

        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;

        Ok(BoundingBox::new(
            (self.center_x - half_w) * w,
            (self.center_y - half_h) * h,
            (self.center_x + half_w) * w,
            (self.center_y + half_h) * h,
        )
        .clamp_to(w, h))
    }
}

fn parse_field(field: &str, name: &str, line_no: usize) -> Result<f64> {
    let value: f64 = field.parse().map_err(|_| {
        DetectionEvalError::MalformedAnnotation(format!(
            "line {line_no}: {name} is not a number: {field:?}"
        ))
    })?;
    if !value.is_finite() {
        return Err(DetectionEvalError::MalformedAnnotation(format!(
            "line {line_no}: {name} is not finite: {field:?}"
        )));
    }
    Ok(value)
}

/// Class ids may be written as floats (`0.0`). Non-whole values map to `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_class_id(value: f64) -> Option<u32> {
    (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then(|| value as u32)
}

fn parse_line(line: &str, line_no: usize) -> Result<YoloLabel> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(DetectionEvalError::MalformedAnnotation(format!(
            "line {line_no}: expected 5 values, got {}",
            parts.len()
        )));
    }

    let class_id = parse_class_id(parse_field(parts[0], "class id", line_no)?);
    if class_id.is_none() {
        log::debug!("line {line_no}: class id {:?} is not a whole number, ignoring it", parts[0]);
    }

    let label = YoloLabel {
        class_id,
        center_x: parse_field(parts[1], "center_x", line_no)?,
        center_y: parse_field(parts[2], "center_y", line_no)?,
        width: parse_field(parts[3], "width", line_no)?,
        height: parse_field(parts[4], "height", line_no)?,
    };

    if label.width < 0.0 || label.height < 0.0 {
        return Err(DetectionEvalError::MalformedAnnotation(format!(
            "line {line_no}: negative box size {}x{}",
            label.width, label.height
        )));
    }

    Ok(label)
}

/// Parse the contents of a YOLO label file.
///
/// Blank lines are ignored. Any other line that does not hold exactly five
/// numeric fields rejects the whole file.
///
/// # Example
///
/// ```
/// use detection_eval::labels::parse_yolo_labels;
///
/// let labels = parse_yolo_labels("0 0.5 0.5 0.2 0.2\n\n1 0.1 0.1 0.05 0.05\n").unwrap();
/// assert_eq!(labels.len(), 2);
/// assert!(parse_yolo_labels("0 0.5 0.5 0.2\n").is_err());
/// ```
pub fn parse_yolo_labels(text: &str) -> Result<Vec<YoloLabel>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

/// Load a YOLO label file.
///
/// A missing file means the image has no ground truth and yields an empty list.
pub fn load_yolo_labels<P: AsRef<Path>>(path: P) -> Result<Vec<YoloLabel>> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::debug!("no label file at {}, treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    parse_yolo_labels(&text).map_err(|err| match err {
        DetectionEvalError::MalformedAnnotation(msg) => {
            DetectionEvalError::MalformedAnnotation(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Convert normalized labels into ground-truth boxes for one image.
pub fn denormalize_labels(
    labels: &[YoloLabel],
    image_width: u32,
    image_height: u32,
) -> Result<Vec<GroundTruthBox>> {
    if image_width == 0 || image_height == 0 {
        return Err(DetectionEvalError::InvalidImageDimensions {
            width: image_width,
            height: image_height,
        });
    }

    labels
        .iter()
        .map(|label| {
            label
                .to_bounding_box(image_width, image_height)
                .map(GroundTruthBox::new)
        })
        .collect()
}

/// Check detector output boxes before they enter matching.
///
/// # Errors
///
/// Returns [`DetectionEvalError::MalformedAnnotation`] for a non-finite or
/// inverted box, or a confidence outside `[0, 1]`.
pub fn validate_detections(detections: &[Detection]) -> Result<()> {
    for (idx, det) in detections.iter().enumerate() {
        if !det.bbox.is_valid() {
            return Err(DetectionEvalError::MalformedAnnotation(format!(
                "detection {idx} has an invalid box {:?}",
                det.bbox
            )));
        }
        if !(0.0..=1.0).contains(&det.confidence) {
            return Err(DetectionEvalError::MalformedAnnotation(format!(
                "detection {idx} has confidence {} outside [0, 1]",
                det.confidence
            )));
        }
    }
    Ok(())
}
