//! JSON loading and report writing.
//!
//! Predictions are read from a single JSON file:
//!
//! ```json
//! {
//!   "images": [
//!     {
//!       "file_name": "img_001.jpg",
//!       "width": 1280,
//!       "height": 720,
//!       "detections": [
//!         {"bbox": {"x_min": 10, "y_min": 20, "x_max": 110, "y_max": 90}, "confidence": 0.91}
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `detections` uses the service's response shape; `confidence` is optional.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DetectionEvalError, Result};
use crate::types::{AggregateMetrics, Detection};

/// Detector output for one image, plus the image's pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePredictions {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Kept undecoded so one bad entry only rejects its own image
    #[serde(default)]
    pub detections: Vec<serde_json::Value>,
}

impl ImagePredictions {
    /// Create an entry from already-typed detections.
    pub fn new(file_name: impl Into<String>, width: u32, height: u32, detections: &[Detection]) -> Result<Self> {
        let detections = detections
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            file_name: file_name.into(),
            width,
            height,
            detections,
        })
    }

    /// Decode the detections of this image.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionEvalError::MalformedAnnotation`] if any entry has a
    /// missing or non-numeric coordinate.
    pub fn detections(&self) -> Result<Vec<Detection>> {
        self.detections
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                Detection::deserialize(value).map_err(|err| {
                    DetectionEvalError::MalformedAnnotation(format!(
                        "{}: detection {idx}: {err}",
                        self.file_name
                    ))
                })
            })
            .collect()
    }

    /// Name of the image without directory or extension.
    pub fn stem(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map_or_else(|| self.file_name.clone(), |s| s.to_string_lossy().into_owned())
    }

    /// Path of this image's label file (`<stem>.txt`) inside `labels_dir`.
    pub fn label_path(&self, labels_dir: &Path) -> PathBuf {
        labels_dir.join(format!("{}.txt", self.stem()))
    }
}

/// All predictions of an evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionsFile {
    pub images: Vec<ImagePredictions>,
}

/// Load predictions from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a predictions
/// document. Problems inside a single detection are deferred to
/// [`ImagePredictions::detections`].
///
/// # Example
///
/// ```no_run
/// use detection_eval::loader::load_predictions_from_file;
///
/// let predictions = load_predictions_from_file("predictions.json").unwrap();
/// println!("Loaded predictions for {} images", predictions.images.len());
/// ```
pub fn load_predictions_from_file<P: AsRef<Path>>(path: P) -> Result<PredictionsFile> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let predictions: PredictionsFile = serde_json::from_reader(reader)?;
    Ok(predictions)
}

/// Load predictions from a JSON string.
///
/// # Example
///
/// ```
/// use detection_eval::loader::load_predictions_from_string;
///
/// let json = r#"{"images": [{"file_name": "a.jpg", "width": 64, "height": 48}]}"#;
/// let predictions = load_predictions_from_string(json).unwrap();
/// assert!(predictions.images[0].detections().unwrap().is_empty());
/// ```
pub fn load_predictions_from_string(json_str: &str) -> Result<PredictionsFile> {
    Ok(serde_json::from_str(json_str)?)
}

/// Write an evaluation report as pretty-printed JSON.
pub fn write_report<P: AsRef<Path>>(path: P, report: &AggregateMetrics) -> Result<()> {
    fs::write(path, report.to_json_pretty()?)?;
    Ok(())
}
