//! Sparse pyramidal optical flow between two grayscale frames.

use opencv::core::{Point2f, Size, TermCriteria, TermCriteria_COUNT, TermCriteria_EPS, Vector};
use opencv::video;
use serde::{Deserialize, Serialize};

use super::transformations::FeaturePoint;
use crate::frame::GrayFrame;
use crate::{Error, Result};

/// Lucas-Kanade tracker parameters, named after the `lk_params` arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LkParams {
    /// Search window size as (width, height).
    pub win_size: (usize, usize),
    /// Coarsest pyramid level (0 = single level).
    pub max_level: usize,
    /// Termination: maximum iterations per level.
    pub max_iter: usize,
    /// Termination: minimum update length in pixels.
    pub epsilon: f64,
    /// Points whose normalised structure tensor eigenvalue falls below this are invalid.
    pub min_eigen_threshold: f64,
}

impl Default for LkParams {
    fn default() -> Self {
        Self {
            win_size: (15, 15),
            max_level: 2,
            max_iter: 10,
            epsilon: 0.03,
            min_eigen_threshold: 1e-4,
        }
    }
}

impl LkParams {
    /// Check the parameters describe a usable tracker.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.win_size;
        if w < 3 || h < 3 {
            return Err(Error::InvalidConfig(format!(
                "flow window must be at least 3x3, got {}x{}",
                w, h
            )));
        }
        if self.max_iter == 0 && self.epsilon <= 0.0 {
            return Err(Error::InvalidConfig(
                "flow termination needs an iteration count or a positive epsilon".to_string(),
            ));
        }
        Ok(())
    }

    fn criteria(&self) -> Result<TermCriteria> {
        Ok(TermCriteria::new(
            TermCriteria_COUNT + TermCriteria_EPS,
            self.max_iter as i32,
            self.epsilon,
        )?)
    }
}

/// Output of one tracking pass, parallel to the input points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowResult {
    /// Location of each input point in the new frame.
    pub next_points: Vec<FeaturePoint>,
    /// Whether the corresponding point was tracked successfully.
    pub status: Vec<bool>,
}

impl FlowResult {
    /// Number of points tracked successfully.
    pub fn num_valid(&self) -> usize {
        self.status.iter().filter(|&&ok| ok).count()
    }

    /// Whether the result holds no points at all.
    pub fn is_empty(&self) -> bool {
        self.next_points.is_empty()
    }
}

/// Tracks feature points from one frame to the next.
#[derive(Debug, Clone)]
pub struct FlowTracker {
    params: LkParams,
}

impl FlowTracker {
    /// Create a tracker with the given Lucas-Kanade parameters.
    pub fn new(params: LkParams) -> Self {
        Self { params }
    }

    /// Lucas-Kanade parameters in use.
    pub fn params(&self) -> &LkParams {
        &self.params
    }

    /// Track `points` from `old` to `new`.
    ///
    /// Individual points that cannot be tracked are flagged in
    /// [`FlowResult::status`]. The whole pair fails when the frames have
    /// different dimensions or OpenCV rejects the input.
    pub fn track(&self, old: &GrayFrame, new: &GrayFrame, points: &[FeaturePoint]) -> Result<FlowResult> {
        if old.width() != new.width() || old.height() != new.height() {
            return Err(Error::InvalidFrame(format!(
                "frame size changed from {}x{} to {}x{}",
                old.width(),
                old.height(),
                new.width(),
                new.height()
            )));
        }

        if points.is_empty() {
            return Ok(FlowResult::default());
        }

        let prev_pts: Vector<Point2f> = points.iter().map(|p| Point2f::new(p.x, p.y)).collect();
        let mut next_pts = Vector::<Point2f>::new();
        let mut status = Vector::<u8>::new();
        let mut err = Vector::<f32>::new();

        let (w, h) = self.params.win_size;
        video::calc_optical_flow_pyr_lk(
            old.as_mat(),
            new.as_mat(),
            &prev_pts,
            &mut next_pts,
            &mut status,
            &mut err,
            Size::new(w as i32, h as i32),
            self.params.max_level as i32,
            self.params.criteria()?,
            0,
            self.params.min_eigen_threshold,
        )?;

        Ok(FlowResult {
            next_points: next_pts.iter().map(|p| FeaturePoint::new(p.x, p.y)).collect(),
            status: status.iter().map(|s| s != 0).collect(),
        })
    }
}

impl Default for FlowTracker {
    fn default() -> Self {
        Self::new(LkParams::default())
    }
}
