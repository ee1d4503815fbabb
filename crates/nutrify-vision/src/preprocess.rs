//! Normalizes a captured image before symbol decoding.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

use crate::RawImage;

/// Sigma equivalent to a 5x5 Gaussian kernel with automatic sigma
/// (`0.3 * ((5 - 1) * 0.5 - 1) + 0.8`).
const BLUR_SIGMA: f32 = 1.1;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 200.0;

/// Grayscale, blur, then Canny edges. Output has the input's dimensions.
#[must_use]
pub fn preprocess(image: &RawImage) -> GrayImage {
    let gray = image.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    canny(&blurred, CANNY_LOW, CANNY_HIGH)
}
