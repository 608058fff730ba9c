// THEORY:
// Stage 8. A sampling kernel estimating the intensity gradient of a grayscale
// image with the 3x3 Sobel pair
//
//     Gx = [-1 0 1; -2 0 2; -1 0 1]      Gy = [-1 -2 -1; 0 0 0; 1 2 1]
//
// applied to the red channel at one-pixel steps. The output is the magnitude
// sqrt(Gx^2 + Gy^2), RGB-encoded and *not* clamped; values above 1 are normal for
// hard edges. Border pixels read through the clamp-to-edge sampler and are a
// known approximation.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::kernel::{PixelKernel, ensure_input, sample_clamped};
use crate::core_modules::raster::FloatImage;
use crate::error::GlareError;
use image::ImageBuffer;

/// Gradient magnitude at (x, y).
///
/// Both gradients are sums of paired differences, so equal neighbours give
/// exactly zero instead of rounding residue.
pub fn gradient_magnitude(image: &FloatImage, x: u32, y: u32) -> f32 {
    let at = |dx: i64, dy: i64| sample_clamped(image, x as i64 + dx, y as i64 + dy).red;
    let gx = (at(1, -1) - at(-1, -1)) + 2.0 * (at(1, 0) - at(-1, 0)) + (at(1, 1) - at(-1, 1));
    let gy = (at(-1, 1) - at(-1, -1)) + 2.0 * (at(0, 1) - at(0, -1)) + (at(1, 1) - at(1, -1));
    (gx * gx + gy * gy).sqrt()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SobelKernel;

impl PixelKernel for SobelKernel {
    type Params = ();

    fn name(&self) -> &'static str {
        "sobel_edge"
    }

    fn apply(&self, image: &FloatImage, _params: &()) -> Result<FloatImage, GlareError> {
        ensure_input(self.name(), image)?;
        Ok(ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            Pixel::gray(gradient_magnitude(image, x, y), 1.0).into()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn flat_image_has_no_edges() {
        let image: FloatImage = ImageBuffer::from_pixel(6, 6, Rgba([0.7, 0.7, 0.7, 1.0]));
        let edges = SobelKernel.apply(&image, &()).unwrap();
        assert!(edges.pixels().all(|p| p[0] == 0.0));
    }

    #[test]
    fn every_flat_level_has_no_edges() {
        for level in 0..=255u8 {
            let value = level as f32 / 255.0;
            let image: FloatImage = ImageBuffer::from_pixel(5, 5, Rgba([value, value, value, 1.0]));
            let edges = SobelKernel.apply(&image, &()).unwrap();
            assert!(
                edges.pixels().all(|p| p[0] == 0.0),
                "flat level {level} produced an edge"
            );
        }
    }

    #[test]
    fn vertical_step_has_expected_magnitude() {
        // Left half 0, right half 1; the step sits between columns 3 and 4.
        let image: FloatImage = ImageBuffer::from_fn(8, 8, |x, _| {
            let level = if x >= 4 { 1.0 } else { 0.0 };
            Rgba([level, level, level, 1.0])
        });
        let edges = SobelKernel.apply(&image, &()).unwrap();

        // Next to the step, Gx = 1 + 2 + 1 and Gy = 0.
        assert!((edges.get_pixel(3, 4)[0] - 4.0).abs() < 1e-6);
        assert!((edges.get_pixel(4, 4)[0] - 4.0).abs() < 1e-6);
        assert_eq!(edges.get_pixel(1, 4)[0], 0.0);
        assert_eq!(edges.get_pixel(6, 4)[0], 0.0);
        assert_eq!(edges.get_pixel(3, 4)[3], 1.0);
    }

    #[test]
    fn border_is_sampled_with_clamping() {
        let image: FloatImage = ImageBuffer::from_fn(3, 3, |x, y| {
            let level = (x + y) as f32 / 4.0;
            Rgba([level, level, level, 1.0])
        });
        let edges = SobelKernel.apply(&image, &()).unwrap();
        assert!(edges.pixels().all(|p| p[0].is_finite()));
        assert!(edges.get_pixel(0, 0)[0] > 0.0);
    }
}
