//! Camera motion estimation module.
//!
//! Estimates a per-frame 2D camera translation from a broadcast video by
//! tracking corner features in static screen regions:
//!
//! - [`FeatureSelector`]: Shi-Tomasi corners restricted to a [`FeatureMask`] (requires OpenCV)
//! - [`FlowTracker`]: pyramidal Lucas-Kanade optical flow (requires OpenCV)
//! - [`select_motion`]: reduces a frame pair's correspondences to one [`MotionVector`]
//! - [`CameraMovementEstimator`]: runs the above over a whole sequence, with an
//!   optional on-disk cache (requires OpenCV)

mod aggregator;
mod cache;
mod mask;
mod transformations;

pub use aggregator::{
    correspondences, select_motion, Correspondence, MotionUpdate, DEFAULT_MINIMUM_DISTANCE,
};
pub use cache::{
    decode_motion_vectors, encode_motion_vectors, load_motion_vectors, save_motion_vectors,
    CACHE_HEADER_SIZE, CACHE_MAGIC, CACHE_VERSION,
};
pub use mask::{FeatureMask, MaskConfig};
pub use transformations::{
    CoordinateTransformation, FeaturePoint, MotionVector, MotionVectorSequence,
};

#[cfg(feature = "opencv")]
mod estimator;
#[cfg(feature = "opencv")]
mod features;
#[cfg(feature = "opencv")]
mod flow;

#[cfg(feature = "opencv")]
pub use estimator::{CameraMovementEstimator, EstimatorConfig, EstimatorState};
#[cfg(feature = "opencv")]
pub use features::{FeatureParams, FeatureSelector};
#[cfg(feature = "opencv")]
pub use flow::{FlowResult, FlowTracker, LkParams};
