/// Warning counters collected during an evaluation run
///
/// Images that cannot be evaluated are skipped rather than aborting the run;
/// this module keeps track of how many were dropped and why, so the final
/// report can surface them.

use serde::{Deserialize, Serialize};

use crate::error::DetectionEvalError;

/// Counts of images excluded from the aggregate totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationWarnings {
    /// Images skipped because a label line or predicted box was malformed
    pub malformed_annotations: usize,

    /// Images skipped because their width or height was zero
    pub invalid_image_dimensions: usize,

    /// Images skipped because their inputs could not be read or decoded
    pub unreadable_inputs: usize,
}

impl EvaluationWarnings {
    /// Create a new `EvaluationWarnings` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one skipped image under the counter matching `error`
    pub fn record(&mut self, error: &DetectionEvalError) {
        match error {
            DetectionEvalError::MalformedAnnotation(_)
            | DetectionEvalError::InvalidBoundingBox(_) => self.malformed_annotations += 1,
            DetectionEvalError::InvalidImageDimensions { .. } => {
                self.invalid_image_dimensions += 1;
            }
            _ => self.unreadable_inputs += 1,
        }
    }

    /// Add another set of counters into this one
    pub fn merge(&mut self, other: &EvaluationWarnings) {
        self.malformed_annotations += other.malformed_annotations;
        self.invalid_image_dimensions += other.invalid_image_dimensions;
        self.unreadable_inputs += other.unreadable_inputs;
    }

    /// Total number of skipped images
    pub fn total(&self) -> usize {
        self.malformed_annotations + self.invalid_image_dimensions + self.unreadable_inputs
    }

    /// Get a formatted string summary of the counters
    pub fn summary_string(&self) -> String {
        format!(
            "EvaluationWarnings {{ skipped: {}, malformed: {}, invalid_dimensions: {}, unreadable: {} }}",
            self.total(),
            self.malformed_annotations,
            self.invalid_image_dimensions,
            self.unreadable_inputs
        )
    }
}
