//! Eye aspect ratio estimation from face mesh landmarks.

use crate::{
    constants::RATIO_SCALE,
    landmarks::{EyeLandmarks, LandmarkSet},
};
use log::debug;

/// Computes the eye aspect ratio of a single eye
#[derive(Debug, Clone, Copy, Default)]
pub struct EarEstimator {
    eye: EyeLandmarks,
}

impl EarEstimator {
    #[must_use]
    pub const fn new(eye: EyeLandmarks) -> Self {
        Self { eye }
    }

    /// Ratio of lid distance to corner distance, scaled by 100 and rounded.
    ///
    /// Returns `None` when the frame carries no usable signal: a required
    /// landmark is missing or the eye corners coincide.
    #[must_use]
    pub fn estimate(&self, landmarks: &LandmarkSet) -> Option<f64> {
        let (Some(top), Some(bottom), Some(left), Some(right)) = (
            landmarks.get(self.eye.top),
            landmarks.get(self.eye.bottom),
            landmarks.get(self.eye.left),
            landmarks.get(self.eye.right),
        ) else {
            debug!("Eye landmarks missing from face mesh output");
            return None;
        };

        let vertical = top.distance(bottom);
        let horizontal = left.distance(right);

        if !horizontal.is_finite() || horizontal <= f64::EPSILON {
            debug!("Degenerate eye geometry, skipping frame");
            return None;
        }

        let ratio = (vertical / horizontal * RATIO_SCALE).round();
        ratio.is_finite().then_some(ratio)
    }
}
