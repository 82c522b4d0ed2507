//! Per-frame camera translation and the coordinate transformation it induces.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A tracked feature location in pixel coordinates.
pub type FeaturePoint = Point2<f32>;

/// Trait for transforming between relative and absolute coordinates.
///
/// Positions can be interpreted in 2 references:
/// - Relative: their position on the current frame, (0, 0) is top left
/// - Absolute: their position in a motion-stabilised space anchored to the camera
///   movement estimate
pub trait CoordinateTransformation: Send + Sync + std::fmt::Debug {
    /// Transform a point from relative (camera frame) to absolute coordinates.
    fn rel_to_abs(&self, point: [f64; 2]) -> [f64; 2];

    /// Transform a point from absolute to relative (camera frame) coordinates.
    fn abs_to_rel(&self, point: [f64; 2]) -> [f64; 2];
}

/// Camera displacement for one frame, in pixels.
///
/// Sign convention: old-frame position minus new-frame position of the tracked
/// background feature. Subtracting it from a raw position cancels the camera
/// movement (see [`CoordinateTransformation::rel_to_abs`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionVector {
    pub dx: f64,
    pub dy: f64,
}

/// One motion vector per input frame.
pub type MotionVectorSequence = Vec<MotionVector>;

impl MotionVector {
    /// No camera movement.
    pub const ZERO: MotionVector = MotionVector { dx: 0.0, dy: 0.0 };

    /// Create a motion vector from its components.
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Displacement `old - new` between a feature's two locations.
    pub fn between(old: &FeaturePoint, new: &FeaturePoint) -> Self {
        Self {
            dx: old.x as f64 - new.x as f64,
            dy: old.y as f64 - new.y as f64,
        }
    }

    /// Euclidean length of the displacement.
    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// The displacement as an nalgebra vector.
    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.dx, self.dy)
    }
}

impl From<[f64; 2]> for MotionVector {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<MotionVector> for [f64; 2] {
    fn from(v: MotionVector) -> Self {
        [v.dx, v.dy]
    }
}

impl CoordinateTransformation for MotionVector {
    /// Convert relative coordinates to absolute by subtracting the movement vector.
    fn rel_to_abs(&self, point: [f64; 2]) -> [f64; 2] {
        [point[0] - self.dx, point[1] - self.dy]
    }

    /// Convert absolute coordinates to relative by adding the movement vector.
    fn abs_to_rel(&self, point: [f64; 2]) -> [f64; 2] {
        [point[0] + self.dx, point[1] + self.dy]
    }
}
