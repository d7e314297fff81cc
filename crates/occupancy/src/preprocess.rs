//! Activity mask preprocessing
//!
//! Converts a raw RGB frame into a single-channel binary mask where active
//! pixels mark edge/texture activity. Fixed stage order: grayscale,
//! Gaussian blur, inverted adaptive threshold, median filter, dilation.

use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::{median_filter, separable_filter};
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::morphology::dilate;
use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

/// Preprocessing parameters.
///
/// Kernel constraints (odd `threshold_block_size` and `median_kernel`,
/// nonzero kernels) are validated by the configuration owner before a
/// frame is ever processed, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessParams {
    /// Gaussian blur kernel (width, height)
    pub blur_kernel: (u32, u32),

    /// Gaussian sigma; values <= 0 derive sigma from the kernel size
    pub blur_sigma: f32,

    /// Adaptive threshold neighborhood size (odd)
    pub threshold_block_size: u32,

    /// Constant subtracted from the local mean
    pub threshold_c: i32,

    /// Median filter kernel size (odd)
    pub median_kernel: u32,

    /// Dilation kernel (width, height)
    pub dilate_kernel: (u32, u32),

    /// Dilation repetitions
    pub dilate_iterations: u32,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            blur_kernel: (3, 3),
            blur_sigma: 1.0,
            threshold_block_size: 25,
            threshold_c: 16,
            median_kernel: 5,
            dilate_kernel: (3, 3),
            dilate_iterations: 1,
        }
    }
}

/// Run the full preprocessing pipeline. Pure function of frame + params;
/// the output mask has the input frame's dimensions.
pub fn preprocess(frame: &RgbImage, params: &PreprocessParams) -> GrayImage {
    let gray = image::imageops::grayscale(frame);

    let h_kernel = gaussian_kernel(params.blur_kernel.0, params.blur_sigma);
    let v_kernel = gaussian_kernel(params.blur_kernel.1, params.blur_sigma);
    let blurred = separable_filter(&gray, &h_kernel, &v_kernel);

    let thresholded =
        adaptive_threshold_inv(&blurred, params.threshold_block_size, params.threshold_c);

    let median_radius = params.median_kernel / 2;
    let smoothed = median_filter(&thresholded, median_radius, median_radius);

    // Square structuring element derived from the kernel size; a 1x1
    // kernel degenerates to a no-op.
    let dilate_radius = (params.dilate_kernel.0.max(params.dilate_kernel.1) / 2) as u8;
    let mut mask = smoothed;
    if dilate_radius > 0 {
        for _ in 0..params.dilate_iterations {
            mask = dilate(&mask, Norm::LInf, dilate_radius);
        }
    }
    mask
}

/// Normalized 1-D Gaussian weights for a kernel of the given size.
///
/// A non-positive sigma falls back to the conventional size-derived value
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let size = size.max(1);
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Inverted mean-adaptive threshold: a pixel is active (255) when it is
/// darker than its local block mean minus `c`. Border blocks clamp to the
/// image edge, so the effective neighborhood shrinks there.
fn adaptive_threshold_inv(image: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let radius = block_size / 2;
    let integral = integral_image::<_, u64>(image);

    for y in 0..height {
        let top = y.saturating_sub(radius);
        let bottom = (y + radius).min(height - 1);
        for x in 0..width {
            let left = x.saturating_sub(radius);
            let right = (x + radius).min(width - 1);

            let sum = sum_image_pixels(&integral, left, top, right, bottom)[0] as f64;
            let area = ((right - left + 1) * (bottom - top + 1)) as f64;
            let threshold = sum / area - c as f64;

            let active = (image.get_pixel(x, y)[0] as f64) <= threshold;
            out.put_pixel(x, y, Luma([if active { 255 } else { 0 }]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_gaussian_kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(5, 1.0);
        assert_eq!(k.len(), 5);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((k[0] - k[4]).abs() < 1e-6);
        assert!((k[1] - k[3]).abs() < 1e-6);
        assert!(k[2] > k[1]);
    }

    #[test]
    fn test_gaussian_kernel_derives_sigma_when_non_positive() {
        let k = gaussian_kernel(3, 0.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_pixels_active() {
        // Bright field with one dark blob: only the blob goes active.
        let mut img = GrayImage::from_pixel(40, 40, Luma([200]));
        for y in 18..22 {
            for x in 18..22 {
                img.put_pixel(x, y, Luma([10]));
            }
        }
        let out = adaptive_threshold_inv(&img, 25, 16);
        assert_eq!(out.get_pixel(20, 20)[0], 255);
        assert_eq!(out.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn test_adaptive_threshold_uniform_image_inactive() {
        // With a positive C a flat image never crosses mean - C.
        let img = GrayImage::from_pixel(30, 30, Luma([128]));
        let out = adaptive_threshold_inv(&img, 25, 16);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_preprocess_preserves_dimensions() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([120, 130, 140]));
        let mask = preprocess(&frame, &PreprocessParams::default());
        assert_eq!(mask.dimensions(), (64, 48));
    }

    #[test]
    fn test_preprocess_textured_region_activates() {
        // Checkerboard patch produces activity after threshold + dilation.
        let mut frame = RgbImage::from_pixel(64, 64, Rgb([200, 200, 200]));
        for y in 20..44 {
            for x in 20..44 {
                if (x + y) % 2 == 0 {
                    frame.put_pixel(x, y, Rgb([10, 10, 10]));
                }
            }
        }
        let mask = preprocess(&frame, &PreprocessParams::default());
        let active: u32 = mask.pixels().filter(|p| p[0] != 0).count() as u32;
        assert!(active > 0);
    }
}
