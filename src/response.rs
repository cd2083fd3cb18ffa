//! Types for the detection service's HTTP response body.
//!
//! The service answers with
//! `{"detections": [{"bbox": {"x_min": 1, "y_min": 2, "x_max": 3, "y_max": 4}}]}`
//! in integer pixel coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{DetectionEvalError, Result};
use crate::types::{BoundingBox, Detection};

/// Integer pixel box as returned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBox {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl From<ResponseBox> for BoundingBox {
    #[allow(clippy::cast_precision_loss)]
    fn from(b: ResponseBox) -> Self {
        BoundingBox::new(b.x_min as f64, b.y_min as f64, b.x_max as f64, b.y_max as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDetection {
    pub bbox: ResponseBox,
}

/// Body of a successful detection response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub detections: Vec<ResponseDetection>,
}

#[allow(clippy::cast_possible_truncation)]
fn to_pixel(value: f64, limit: u32) -> i64 {
    // truncate toward zero, then keep inside the last pixel row/column
    let max = i64::from(limit) - 1;
    (value.max(0.0) as i64).clamp(0, max)
}

impl DetectionResponse {
    /// Build a response from final detections for an image of `width x height`.
    ///
    /// Coordinates are truncated to integers and clamped into
    /// `[0, width - 1] x [0, height - 1]`. Confidences are not part of the
    /// response.
    ///
    /// # Example
    ///
    /// ```
    /// use detection_eval::response::DetectionResponse;
    /// use detection_eval::types::{BoundingBox, Detection};
    ///
    /// let dets = vec![Detection::new(BoundingBox::new(-3.2, 10.9, 640.0, 99.5), 0.8)];
    /// let response = DetectionResponse::from_detections(&dets, 640, 480).unwrap();
    /// let b = response.detections[0].bbox;
    /// assert_eq!((b.x_min, b.y_min, b.x_max, b.y_max), (0, 10, 639, 99));
    /// ```
    pub fn from_detections(detections: &[Detection], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DetectionEvalError::InvalidImageDimensions { width, height });
        }

        let detections = detections
            .iter()
            .map(|det| ResponseDetection {
                bbox: ResponseBox {
                    x_min: to_pixel(det.bbox.x_min, width),
                    y_min: to_pixel(det.bbox.y_min, height),
                    x_max: to_pixel(det.bbox.x_max, width),
                    y_max: to_pixel(det.bbox.y_max, height),
                },
            })
            .collect();

        Ok(Self { detections })
    }

    /// Boxes of the response in float pixel space, in response order.
    pub fn boxes(&self) -> Vec<BoundingBox> {
        self.detections.iter().map(|d| d.bbox.into()).collect()
    }
}
