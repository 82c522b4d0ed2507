//! # Pancam - Camera Movement Estimation
//!
//! Estimates the per-frame camera pan/tilt of a sports broadcast and removes it
//! from tracked object positions.
//!
//! ## Features
//!
//! - Shi-Tomasi feature selection restricted to static screen regions (`opencv` feature)
//! - Pyramidal Lucas-Kanade optical flow (`opencv` feature)
//! - Noise-floored motion aggregation with feature re-seeding
//! - Binary cache of the estimated motion sequence
//! - Position compensation for externally produced track tables
//! - Diagnostic overlay (`drawing` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use pancam_rs::{CameraMovementEstimator, TrackTable};
//!
//! let estimator = CameraMovementEstimator::new(&frames[0]);
//! let movement = estimator.get_camera_movement(&frames, true, Some(cache_path));
//!
//! let mut tracks = TrackTable::from_json_file("tracks.json")?;
//! estimator.add_adjust_positions_to_tracks(&mut tracks, &movement);
//! ```

// Public modules
pub mod camera_motion;
pub mod frame;
pub mod tracks;
pub mod utils;

// Optional modules
#[cfg(feature = "drawing")]
pub mod drawing;

// Re-exports for convenience
pub use camera_motion::{CoordinateTransformation, MotionVector, MotionVectorSequence};
pub use frame::Frame;

#[cfg(feature = "opencv")]
pub use camera_motion::{CameraMovementEstimator, EstimatorConfig};
#[cfg(feature = "opencv")]
pub use frame::GrayFrame;
pub use tracks::{adjust_positions, AdjustmentSummary, ObjectRecord, TrackTable};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the pancam library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid frame: {0}")]
        InvalidFrame(String),

        #[error("Cache error: {0}")]
        CacheError(String),

        #[error("Serialization error: {0}")]
        SerializationError(String),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),

        #[cfg(feature = "opencv")]
        #[error("OpenCV error: {0}")]
        OpenCv(#[from] opencv::Error),
    }

    /// Result type for pancam operations
    pub type Result<T> = std::result::Result<T, Error>;
}
