// THEORY:
// Stage 3. Clamps every channel into a bright band [min, max]. Values below the
// floor are *raised* to the floor, not zeroed: the output is a nearly flat image
// sitting at the floor everywhere except where the blurred luminance already
// exceeded it. The contour tracer downstream therefore separates near-maximum
// pixels from floor-valued pixels, never bright from dark in general.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::kernel::{PixelKernel, map_pixels};
use crate::core_modules::raster::FloatImage;
use crate::error::{GlareError, Stage};

/// Per-channel (r, g, b, a) bounds of the bright band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampRange {
    pub min: [f32; 4],
    pub max: [f32; 4],
}

impl Default for ClampRange {
    fn default() -> Self {
        Self {
            min: [0.9, 0.9, 0.9, 1.0],
            max: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl ClampRange {
    pub fn validate(&self) -> Result<(), GlareError> {
        for channel in 0..4 {
            let (lo, hi) = (self.min[channel], self.max[channel]);
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(GlareError::stage_unavailable(
                    Stage::Clamp,
                    format!("channel {channel} has an invalid band [{lo}, {hi}]"),
                ));
            }
        }
        Ok(())
    }

    /// Luminance of the floor and ceiling colors.
    pub fn luminance_band(&self) -> (f32, f32) {
        let floor = Pixel::new(self.min[0], self.min[1], self.min[2], self.min[3]);
        let ceiling = Pixel::new(self.max[0], self.max[1], self.max[2], self.max[3]);
        (floor.luminance(), ceiling.luminance())
    }
}

/// Range-clamp color kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeClampKernel;

impl PixelKernel for RangeClampKernel {
    type Params = ClampRange;

    fn name(&self) -> &'static str {
        "range_clamp"
    }

    fn apply(&self, image: &FloatImage, range: &ClampRange) -> Result<FloatImage, GlareError> {
        range.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(GlareError::stage_unavailable(Stage::Clamp, "input image is empty"));
        }
        Ok(map_pixels(image, |p| {
            Pixel::new(
                p.red.clamp(range.min[0], range.max[0]),
                p.green.clamp(range.min[1], range.max[1]),
                p.blue.clamp(range.min[2], range.max[2]),
                p.alpha.clamp(range.min[3], range.max[3]),
            )
        }))
    }
}
