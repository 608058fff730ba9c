// THEORY:
// A `PixelKernel` is a small, reusable per-pixel program: it reads one image and
// a parameter block and writes a new image of the same size. The CPU reference
// backend below is the only backend; kernels are plain structs with no interior
// state, so a single instance can be shared by any number of concurrent calls.
//
// Two shapes of kernel exist:
// 1.  **Color kernels** (`map_pixels`) see one input pixel at a time. Grayscale,
//     range clamping and the HSV classifier are color kernels.
// 2.  **Sampling kernels** read a neighbourhood through `sample_clamped`, whose
//     clamp-to-edge policy is the only border handling they get. Sobel is one.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::raster::FloatImage;
use crate::error::GlareError;
use image::ImageBuffer;

/// A per-pixel image program with an `apply(image, params) -> image` contract.
pub trait PixelKernel: Send + Sync {
    type Params;

    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    fn apply(&self, image: &FloatImage, params: &Self::Params) -> Result<FloatImage, GlareError>;
}

/// Applies `f` to every pixel of `image`, preserving dimensions.
pub fn map_pixels<F>(image: &FloatImage, f: F) -> FloatImage
where
    F: Fn(Pixel) -> Pixel,
{
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        f(Pixel::from(image.get_pixel(x, y))).into()
    })
}

/// Reads the pixel at (x, y), clamping coordinates to the image edge.
///
/// Callers must not pass an empty image.
pub fn sample_clamped(image: &FloatImage, x: i64, y: i64) -> Pixel {
    let cx = x.clamp(0, image.width() as i64 - 1) as u32;
    let cy = y.clamp(0, image.height() as i64 - 1) as u32;
    Pixel::from(image.get_pixel(cx, cy))
}

/// Rejects zero-sized inputs before a kernel touches them.
pub fn ensure_input(kernel: &'static str, image: &FloatImage) -> Result<(), GlareError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(GlareError::kernel(kernel, "input image is empty"));
    }
    Ok(())
}

/// Rejects NaN and infinite parameters.
pub fn ensure_finite(kernel: &'static str, label: &str, value: f32) -> Result<(), GlareError> {
    if !value.is_finite() {
        return Err(GlareError::kernel(kernel, format!("{label} must be finite, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn ramp() -> FloatImage {
        ImageBuffer::from_fn(3, 2, |x, y| {
            let level = (x + 3 * y) as f32 / 10.0;
            Rgba([level, level, level, 1.0])
        })
    }

    #[test]
    fn clamped_sampling_replicates_edges() {
        let image = ramp();
        assert_eq!(sample_clamped(&image, -5, -5), sample_clamped(&image, 0, 0));
        assert_eq!(sample_clamped(&image, 10, 0), sample_clamped(&image, 2, 0));
        assert_eq!(sample_clamped(&image, 1, 7), sample_clamped(&image, 1, 1));
    }

    #[test]
    fn map_pixels_keeps_dimensions() {
        let image = ramp();
        let inverted = map_pixels(&image, |p| Pixel::gray(1.0 - p.red, p.alpha));
        assert_eq!(inverted.dimensions(), (3, 2));
        assert!((inverted.get_pixel(0, 0)[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_input_is_rejected() {
        let empty = FloatImage::new(0, 4);
        assert!(ensure_input("test", &empty).is_err());
        assert!(ensure_finite("test", "level", f32::NAN).is_err());
        assert!(ensure_finite("test", "level", 0.5).is_ok());
    }
}
