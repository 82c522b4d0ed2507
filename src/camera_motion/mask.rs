//! Spatial mask restricting where tracking features may be selected.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Column bands (half-open `[start, end)`) where features may be selected.
///
/// The defaults cover a narrow strip on the left edge and a band of static
/// background next to the centre of a broadcast frame, areas that rarely
/// contain players so their apparent motion is dominated by the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub column_bands: Vec<(u32, u32)>,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            column_bands: vec![(0, 20), (900, 1050)],
        }
    }
}

/// Binary image with the frame's dimensions: 1 where feature search is permitted.
///
/// Built once from the first frame and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMask {
    mask: GrayImage,
}

impl FeatureMask {
    /// Build the mask for a `width x height` frame. Bands are clipped to the width.
    pub fn new(width: u32, height: u32, config: &MaskConfig) -> Self {
        let mut mask = GrayImage::new(width, height);
        for &(start, end) in &config.column_bands {
            let end = end.min(width);
            for x in start.min(end)..end {
                for y in 0..height {
                    mask.put_pixel(x, y, Luma([1]));
                }
            }
        }
        Self { mask }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    /// Mask value at `(x, y)`; 0 outside the mask bounds.
    pub fn value(&self, x: u32, y: u32) -> u8 {
        if x < self.mask.width() && y < self.mask.height() {
            self.mask.get_pixel(x, y)[0]
        } else {
            0
        }
    }

    /// Whether features may be selected at `(x, y)`.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.value(x, y) == 1
    }

    /// Borrow the underlying binary image.
    pub fn as_image(&self) -> &GrayImage {
        &self.mask
    }
}
