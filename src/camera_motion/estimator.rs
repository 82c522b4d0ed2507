//! Camera movement estimation over a frame sequence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregator::{correspondences, select_motion, MotionUpdate, DEFAULT_MINIMUM_DISTANCE};
use super::cache::{load_motion_vectors, save_motion_vectors};
use super::features::{FeatureParams, FeatureSelector};
use super::flow::{FlowTracker, LkParams};
use super::mask::{FeatureMask, MaskConfig};
use super::transformations::{FeaturePoint, MotionVector, MotionVectorSequence};
use crate::frame::{Frame, GrayFrame};
use crate::tracks::{adjust_positions, AdjustmentSummary, TrackTable};
use crate::utils::warn_once;
use crate::{Error, Result};

/// Configuration for the camera movement estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Noise floor: displacements up to this many pixels are not camera motion.
    pub minimum_distance: f64,

    /// Where features may be selected.
    pub mask: MaskConfig,

    /// Corner selection parameters.
    pub features: FeatureParams,

    /// Optical flow parameters.
    pub flow: LkParams,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            minimum_distance: DEFAULT_MINIMUM_DISTANCE,
            mask: MaskConfig::default(),
            features: FeatureParams::default(),
            flow: LkParams::default(),
        }
    }
}

impl EstimatorConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.minimum_distance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "minimum_distance must be non-negative, got {}",
                self.minimum_distance
            )));
        }
        if self.features.max_corners == 0 {
            return Err(Error::InvalidConfig("max_corners must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.features.quality_level) || self.features.quality_level == 0.0 {
            return Err(Error::InvalidConfig(format!(
                "quality_level must be in (0, 1], got {}",
                self.features.quality_level
            )));
        }
        if self.features.block_size < 3 || self.features.block_size % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "block_size must be odd and at least 3, got {}",
                self.features.block_size
            )));
        }
        for &(start, end) in &self.mask.column_bands {
            if start >= end {
                return Err(Error::InvalidConfig(format!(
                    "mask band [{}, {}) is empty",
                    start, end
                )));
            }
        }
        self.flow.validate()
    }
}

/// Tracking state carried from one frame pair to the next.
#[derive(Debug, Clone)]
pub struct EstimatorState {
    /// Grayscale copy of the most recent frame.
    pub gray: GrayFrame,
    /// Features located in `gray`.
    pub features: Vec<FeaturePoint>,
}

/// Estimates the per-frame 2D camera translation of a broadcast video.
///
/// The feature mask and tracker parameters are fixed at construction from
/// the first frame. Estimation itself is a strictly sequential fold over the
/// frames (see [`CameraMovementEstimator::step`]).
#[derive(Debug, Clone)]
pub struct CameraMovementEstimator {
    config: EstimatorConfig,
    mask: FeatureMask,
    selector: FeatureSelector,
    tracker: FlowTracker,
}

impl CameraMovementEstimator {
    /// Create an estimator with the default configuration.
    pub fn new(first_frame: &Frame) -> Self {
        let config = EstimatorConfig::default();
        Self::build(first_frame, config)
    }

    /// Create an estimator with a custom configuration.
    pub fn with_config(first_frame: &Frame, config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(first_frame, config))
    }

    fn build(first_frame: &Frame, config: EstimatorConfig) -> Self {
        let mask = FeatureMask::new(first_frame.width(), first_frame.height(), &config.mask);
        let selector = FeatureSelector::new(config.features.clone());
        let tracker = FlowTracker::new(config.flow.clone());
        Self {
            config,
            mask,
            selector,
            tracker,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Feature mask built from the first frame.
    pub fn mask(&self) -> &FeatureMask {
        &self.mask
    }

    /// Select features in a grayscale frame using the estimator's mask.
    ///
    /// A frame whose size differs from the mask yields no features.
    pub fn select_features(&self, gray: &GrayFrame) -> Vec<FeaturePoint> {
        match self.selector.select(gray, &self.mask) {
            Ok(features) => features,
            Err(e) => {
                warn!(error = %e, "feature selection failed");
                Vec::new()
            }
        }
    }

    /// Initial tracking state for the first frame of a sequence.
    pub fn begin(&self, first_frame: &Frame) -> Result<EstimatorState> {
        let gray = GrayFrame::from_frame(first_frame)?;
        let features = self.select_features(&gray);
        debug!(num_features = features.len(), "selected initial features");
        Ok(EstimatorState { gray, features })
    }

    /// Process one frame pair.
    ///
    /// `state` describes frame `n - 1` and `previous` is its motion vector.
    /// Returns the state for frame `n` and the motion update for frame `n`.
    /// The grayscale frame always advances; features are re-selected on the
    /// new frame only when significant motion was found. A failed flow
    /// computation counts as no motion. Fails only when `frame` cannot be
    /// converted to grayscale.
    pub fn step(
        &self,
        state: &EstimatorState,
        frame: &Frame,
        previous: MotionVector,
    ) -> Result<(EstimatorState, MotionUpdate)> {
        let gray = GrayFrame::from_frame(frame)?;

        let pairs = if state.features.is_empty() {
            Vec::new()
        } else {
            match self.tracker.track(&state.gray, &gray, &state.features) {
                Ok(flow) => correspondences(&state.features, &flow.next_points, &flow.status),
                Err(e) => {
                    warn!(error = %e, "optical flow failed for frame pair");
                    Vec::new()
                }
            }
        };

        let update = select_motion(&pairs, previous, self.config.minimum_distance);

        let features = if update.reseed {
            self.select_features(&gray)
        } else {
            state.features.clone()
        };

        Ok((EstimatorState { gray, features }, update))
    }

    /// Estimate the motion vector of every frame.
    ///
    /// The result always has one entry per frame and starts with
    /// [`MotionVector::ZERO`]. With fewer than two frames no computation is
    /// attempted and the result is all zeros.
    pub fn estimate(&self, frames: &[Frame]) -> MotionVectorSequence {
        let mut movement = vec![MotionVector::ZERO; frames.len()];

        if frames.len() < 2 {
            warn!(num_frames = frames.len(), "not enough frames to compute camera movement");
            return movement;
        }

        let mut state = match self.begin(&frames[0]) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "could not prepare first frame, camera movement is zero");
                return movement;
            }
        };

        for frame_num in 1..frames.len() {
            if state.features.is_empty() {
                warn_once("no features to track, camera movement is propagated unchanged");
            }

            let previous = movement[frame_num - 1];
            let (next_state, update) = match self.step(&state, &frames[frame_num], previous) {
                Ok(result) => result,
                Err(e) => {
                    warn!(frame_num, error = %e, "skipping unreadable frame");
                    movement[frame_num] = previous;
                    continue;
                }
            };
            state = next_state;
            movement[frame_num] = update.vector;

            if update.reseed {
                debug!(
                    frame_num,
                    dx = update.vector.dx,
                    dy = update.vector.dy,
                    max_distance = update.max_distance,
                    num_features = state.features.len(),
                    "camera moved, re-seeded features"
                );
            }
        }

        movement
    }

    /// Estimate camera movement, optionally reading from and writing to a cache file.
    ///
    /// When `read_from_cache` is set and `cache_path` names an existing file, its
    /// contents are returned without looking at `frames`. An unreadable or
    /// corrupt cache counts as a miss. After computing, the result is written
    /// to `cache_path` (if given), overwriting any previous file; failures to
    /// write are logged and otherwise ignored.
    pub fn get_camera_movement(
        &self,
        frames: &[Frame],
        read_from_cache: bool,
        cache_path: Option<&Path>,
    ) -> MotionVectorSequence {
        if read_from_cache {
            if let Some(path) = cache_path.filter(|p| p.exists()) {
                match load_motion_vectors(path) {
                    Ok(movement) => {
                        info!(path = %path.display(), num_frames = movement.len(), "loaded camera movement from cache");
                        return movement;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring unreadable camera movement cache");
                    }
                }
            }
        }

        let movement = self.estimate(frames);

        if let Some(path) = cache_path {
            match save_motion_vectors(path, &movement) {
                Ok(()) => debug!(path = %path.display(), "saved camera movement cache"),
                Err(e) => warn!(path = %path.display(), error = %e, "could not save camera movement cache"),
            }
        }

        movement
    }

    /// Write `position_adjusted` for every record of `tracks` covered by `movement`.
    ///
    /// See [`adjust_positions`].
    pub fn add_adjust_positions_to_tracks(
        &self,
        tracks: &mut TrackTable,
        movement: &[MotionVector],
    ) -> AdjustmentSummary {
        adjust_positions(tracks, movement)
    }
}
