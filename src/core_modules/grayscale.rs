// THEORY:
// Stage 1 of both pipelines. Reduces a color image to luminance with the fixed
// Rec. 601 weighting from the 1D pixel heuristics. The result is RGB-encoded
// (r = g = b = luma) with alpha passed through, so every later stage can keep
// reading or writing plain RGBA.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::kernel::{PixelKernel, ensure_input, map_pixels};
use crate::core_modules::raster::FloatImage;
use crate::error::GlareError;

/// Monochrome color kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrayscaleKernel;

impl PixelKernel for GrayscaleKernel {
    type Params = ();

    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, image: &FloatImage, _params: &()) -> Result<FloatImage, GlareError> {
        ensure_input(self.name(), image)?;
        Ok(map_pixels(image, |pixel| {
            Pixel::gray(pixel.luminance().clamp(0.0, 1.0), pixel.alpha)
        }))
    }
}
