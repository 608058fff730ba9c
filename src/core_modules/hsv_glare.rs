// THEORY:
// Stage 7. A color kernel that flags likely specular glare per pixel: bright
// (HSV value above `value_threshold`) *and* desaturated (HSV saturation below
// `saturation_limit`). Bright saturated pixels are colored light sources, not
// reflections, and stay in the background.
//
// Flagged pixels become `glare_color`, everything else `background_color`.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::kernel::{PixelKernel, ensure_finite, ensure_input, map_pixels};
use crate::core_modules::raster::FloatImage;
use crate::error::GlareError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvGlareParams {
    pub value_threshold: f32,
    pub saturation_limit: f32,
    pub glare_color: [f32; 4],
    pub background_color: [f32; 4],
}

impl Default for HsvGlareParams {
    fn default() -> Self {
        Self {
            value_threshold: 0.9,
            saturation_limit: 0.2,
            glare_color: [1.0, 1.0, 1.0, 1.0],
            background_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// True when the pixel is bright and desaturated enough to count as glare.
pub fn is_glare_pixel(pixel: &Pixel, value_threshold: f32, saturation_limit: f32) -> bool {
    pixel.value_hsv() > value_threshold && pixel.saturation_hsv() < saturation_limit
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HsvGlareKernel;

impl PixelKernel for HsvGlareKernel {
    type Params = HsvGlareParams;

    fn name(&self) -> &'static str {
        "hsv_glare"
    }

    fn apply(&self, image: &FloatImage, params: &HsvGlareParams) -> Result<FloatImage, GlareError> {
        ensure_input(self.name(), image)?;
        ensure_finite(self.name(), "value threshold", params.value_threshold)?;
        ensure_finite(self.name(), "saturation limit", params.saturation_limit)?;

        let [gr, gg, gb, ga] = params.glare_color;
        let [br, bg, bb, ba] = params.background_color;
        Ok(map_pixels(image, |pixel| {
            if is_glare_pixel(&pixel, params.value_threshold, params.saturation_limit) {
                Pixel::new(gr, gg, gb, ga)
            } else {
                Pixel::new(br, bg, bb, ba)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn classify(rgb: [f32; 3]) -> f32 {
        let image: FloatImage = ImageBuffer::from_pixel(1, 1, Rgba([rgb[0], rgb[1], rgb[2], 1.0]));
        HsvGlareKernel.apply(&image, &HsvGlareParams::default()).unwrap().get_pixel(0, 0)[0]
    }

    #[test]
    fn white_is_glare() {
        assert_eq!(classify([1.0, 1.0, 1.0]), 1.0);
        assert_eq!(classify([0.95, 0.93, 0.97]), 1.0);
    }

    #[test]
    fn saturated_or_dim_pixels_are_not_glare() {
        assert_eq!(classify([1.0, 0.0, 0.0]), 0.0);
        assert_eq!(classify([1.0, 0.7, 0.7]), 0.0);
        assert_eq!(classify([0.85, 0.85, 0.85]), 0.0);
        assert_eq!(classify([0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(classify([0.9, 0.9, 0.9]), 0.0);
    }

    #[test]
    fn marker_colors_come_from_params() {
        let image: FloatImage = ImageBuffer::from_fn(2, 1, |x, _| {
            let level = if x == 0 { 1.0 } else { 0.1 };
            Rgba([level, level, level, 1.0])
        });
        let params = HsvGlareParams {
            glare_color: [1.0, 0.0, 0.0, 1.0],
            ..HsvGlareParams::default()
        };
        let mask = HsvGlareKernel.apply(&image, &params).unwrap();
        assert_eq!(mask.get_pixel(0, 0), &Rgba([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(mask.get_pixel(1, 0), &Rgba([0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn non_finite_threshold_is_a_kernel_failure() {
        let image: FloatImage = ImageBuffer::from_pixel(1, 1, Rgba([1.0, 1.0, 1.0, 1.0]));
        let params = HsvGlareParams {
            value_threshold: f32::NAN,
            ..HsvGlareParams::default()
        };
        assert!(matches!(
            HsvGlareKernel.apply(&image, &params),
            Err(GlareError::Kernel { kernel: "hsv_glare", .. })
        ));
    }
}
