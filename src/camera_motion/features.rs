//! Feature selection: trackable corner points inside the feature mask.

use opencv::core::{Point2f, Vector, CV_8UC1};
use opencv::imgproc;
use serde::{Deserialize, Serialize};

use super::mask::FeatureMask;
use super::transformations::FeaturePoint;
use crate::frame::{image_to_mat, GrayFrame};
use crate::{Error, Result};

/// Corner selection parameters, named after the `goodFeaturesToTrack` arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Maximum number of points returned.
    pub max_corners: usize,
    /// Minimum accepted score relative to the strongest candidate.
    pub quality_level: f64,
    /// Minimum pixel distance between returned points.
    pub min_distance: f64,
    /// Side of the neighbourhood used for corner scoring.
    pub block_size: usize,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            max_corners: 100,
            quality_level: 0.3,
            min_distance: 3.0,
            block_size: 7,
        }
    }
}

/// Picks a bounded set of Shi-Tomasi corners restricted to a [`FeatureMask`].
#[derive(Debug, Clone)]
pub struct FeatureSelector {
    params: FeatureParams,
}

impl FeatureSelector {
    /// Create a selector with the given corner parameters.
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    /// Corner parameters in use.
    pub fn params(&self) -> &FeatureParams {
        &self.params
    }

    /// Select features in `frame`, strongest first.
    ///
    /// Returns an empty vector when the masked region has no detectable corners;
    /// callers treat that as "no flow possible" rather than an error.
    pub fn select(&self, frame: &GrayFrame, mask: &FeatureMask) -> Result<Vec<FeaturePoint>> {
        if mask.width() as usize != frame.width() || mask.height() as usize != frame.height() {
            return Err(Error::InvalidFrame(format!(
                "mask is {}x{} but frame is {}x{}",
                mask.width(),
                mask.height(),
                frame.width(),
                frame.height()
            )));
        }

        let image = mask.as_image();
        let mask_mat = image_to_mat(image.as_raw(), image.width(), image.height(), CV_8UC1)?;

        let mut corners = Vector::<Point2f>::new();
        imgproc::good_features_to_track(
            frame.as_mat(),
            &mut corners,
            self.params.max_corners as i32,
            self.params.quality_level,
            self.params.min_distance,
            &mask_mat,
            self.params.block_size as i32,
            false,
            0.04,
        )?;

        Ok(corners.iter().map(|p| FeaturePoint::new(p.x, p.y)).collect())
    }
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new(FeatureParams::default())
    }
}
