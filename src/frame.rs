//! Frame types consumed by the estimator.

use image::RgbImage;

/// A decoded video frame: height x width x 3 channels, 8 bits per channel.
///
/// Frames are owned by the caller and never mutated by the estimator.
pub type Frame = RgbImage;

#[cfg(feature = "opencv")]
pub use self::gray::GrayFrame;

#[cfg(feature = "opencv")]
pub(crate) use self::gray::image_to_mat;

#[cfg(feature = "opencv")]
mod gray {
    use image::GrayImage;
    use opencv::core::{Mat, Scalar, CV_8UC1, CV_8UC3};
    use opencv::imgproc;
    use opencv::prelude::*;

    use super::Frame;
    use crate::{Error, Result};

    /// Copy a tightly packed 8-bit image buffer into a new `Mat`.
    pub(crate) fn image_to_mat(raw: &[u8], width: u32, height: u32, typ: i32) -> Result<Mat> {
        let mut mat = Mat::new_rows_cols_with_default(height as i32, width as i32, typ, Scalar::all(0.0))?;
        let data = mat.data_bytes_mut()?;
        if data.len() != raw.len() {
            return Err(Error::InvalidFrame(format!(
                "expected {} bytes for a {}x{} image, got {}",
                data.len(),
                width,
                height,
                raw.len()
            )));
        }
        data.copy_from_slice(raw);
        Ok(mat)
    }

    /// Private single-channel 8-bit copy of a frame used by the OpenCV routines.
    #[derive(Debug, Clone)]
    pub struct GrayFrame {
        mat: Mat,
    }

    impl GrayFrame {
        /// Convert a color frame to grayscale without touching the original.
        ///
        /// Uses OpenCV's `COLOR_RGB2GRAY` (BT.601 luma weights).
        pub fn from_frame(frame: &Frame) -> Result<Self> {
            let rgb = image_to_mat(frame.as_raw(), frame.width(), frame.height(), CV_8UC3)?;
            let mut mat = Mat::default();
            imgproc::cvt_color_def(&rgb, &mut mat, imgproc::COLOR_RGB2GRAY)?;
            Ok(Self { mat })
        }

        /// Wrap an 8-bit grayscale image.
        pub fn from_gray_image(gray: &GrayImage) -> Result<Self> {
            let mat = image_to_mat(gray.as_raw(), gray.width(), gray.height(), CV_8UC1)?;
            Ok(Self { mat })
        }

        /// Frame width in pixels.
        pub fn width(&self) -> usize {
            self.mat.cols() as usize
        }

        /// Frame height in pixels.
        pub fn height(&self) -> usize {
            self.mat.rows() as usize
        }

        /// Intensity at pixel `(x, y)`, `None` outside the frame.
        pub fn get(&self, x: usize, y: usize) -> Option<u8> {
            self.mat.at_2d::<u8>(y as i32, x as i32).ok().copied()
        }

        /// Raw pixel bytes in row-major order.
        pub fn as_bytes(&self) -> Result<&[u8]> {
            Ok(self.mat.data_bytes()?)
        }

        /// Underlying OpenCV matrix.
        pub fn as_mat(&self) -> &Mat {
            &self.mat
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use image::Rgb;

        #[test]
        fn test_grayscale_conversion_keeps_neutral_colors() {
            let mut frame = Frame::new(4, 3);
            frame.put_pixel(1, 2, Rgb([200, 200, 200]));

            let gray = GrayFrame::from_frame(&frame).unwrap();

            assert_eq!(gray.width(), 4);
            assert_eq!(gray.height(), 3);
            assert_eq!(gray.get(1, 2), Some(200));
            assert_eq!(gray.get(0, 0), Some(0));
            assert_eq!(gray.get(4, 0), None);
        }

        #[test]
        fn test_grayscale_uses_bt601_weights() {
            let mut frame = Frame::new(3, 1);
            frame.put_pixel(0, 0, Rgb([255, 0, 0]));
            frame.put_pixel(1, 0, Rgb([0, 255, 0]));
            frame.put_pixel(2, 0, Rgb([0, 0, 255]));

            let gray = GrayFrame::from_frame(&frame).unwrap();

            // 0.299 / 0.587 / 0.114, not the Rec. 709 54 / 182 / 18
            let near = |value: Option<u8>, expected: i32| {
                value.map_or(false, |v| (v as i32 - expected).abs() <= 1)
            };
            assert!(near(gray.get(0, 0), 76), "red -> {:?}", gray.get(0, 0));
            assert!(near(gray.get(1, 0), 150), "green -> {:?}", gray.get(1, 0));
            assert!(near(gray.get(2, 0), 29), "blue -> {:?}", gray.get(2, 0));
        }

        #[test]
        fn test_conversion_does_not_mutate_frame() {
            let frame = Frame::from_pixel(5, 5, Rgb([10, 20, 30]));
            let copy = frame.clone();

            let _ = GrayFrame::from_frame(&frame).unwrap();

            assert_eq!(frame, copy);
        }

        #[test]
        fn test_from_gray_image_roundtrips_bytes() {
            let img = GrayImage::from_fn(7, 5, |x, y| image::Luma([(x * 10 + y) as u8]));

            let gray = GrayFrame::from_gray_image(&img).unwrap();

            assert_eq!(gray.as_bytes().unwrap(), img.as_raw().as_slice());
            assert_eq!(gray.get(6, 4), Some(64));
        }
    }
}
