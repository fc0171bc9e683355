//! Facial landmark types and the landmark source seam.
//!
//! A [`LandmarkSet`] is the per-frame output of the face mesh: a mapping from
//! mesh index to a 2D pixel coordinate. It is produced once per frame and
//! dropped after the frame has been processed.

use crate::{
    constants::{LEFT_EYE_BOTTOM, LEFT_EYE_LEFT_CORNER, LEFT_EYE_RIGHT_CORNER, LEFT_EYE_TOP},
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 2D landmark position in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another landmark
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

/// Landmarks of a single detected face, keyed by mesh index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: HashMap<usize, Landmark>,
}

impl LandmarkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, landmark: Landmark) {
        self.points.insert(index, landmark);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Landmark)> {
        self.points.iter().map(|(&index, landmark)| (index, landmark))
    }
}

impl FromIterator<(usize, Landmark)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (usize, Landmark)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Mesh indices of the four eye points used for the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    /// Upper lid
    pub top: usize,
    /// Lower lid
    pub bottom: usize,
    /// Outer corner
    pub left: usize,
    /// Inner corner
    pub right: usize,
}

impl EyeLandmarks {
    #[must_use]
    pub const fn indices(&self) -> [usize; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

impl Default for EyeLandmarks {
    fn default() -> Self {
        Self {
            top: LEFT_EYE_TOP,
            bottom: LEFT_EYE_BOTTOM,
            left: LEFT_EYE_LEFT_CORNER,
            right: LEFT_EYE_RIGHT_CORNER,
        }
    }
}

/// Source of frames and single-face landmarks
///
/// Implementations capture a frame and run an external face mesh on it.
/// `detect` returns `None` when no face is visible.
pub trait LandmarkSource {
    /// Frame type handed to the presentation layer
    type Frame;

    /// Capture the next frame
    ///
    /// # Errors
    ///
    /// Returns an error if the capture device fails
    fn capture_frame(&mut self) -> Result<Self::Frame>;

    /// Detect landmarks of at most one face in the frame
    ///
    /// # Errors
    ///
    /// Returns an error if landmark inference fails
    fn detect(&mut self, frame: &Self::Frame) -> Result<Option<LandmarkSet>>;
}
