// THEORY:
// `GlareMask` is the output of Pipeline B: a per-pixel classification strength in
// [0, 1], stored RGB-encoded so it can be viewed directly. The strength is read
// from the red channel, which is the one channel every marker color sets.

use crate::core_modules::raster::{FloatImage, RasterImage};

#[derive(Debug, Clone, PartialEq)]
pub struct GlareMask {
    image: FloatImage,
}

impl GlareMask {
    pub fn new(image: FloatImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &FloatImage {
        &self.image
    }

    /// Classification strength at (x, y); 0.0 outside the mask.
    pub fn strength(&self, x: u32, y: u32) -> f32 {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| p[0].clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn is_glare(&self, x: u32, y: u32) -> bool {
        self.strength(x, y) > 0.0
    }

    /// Fraction of pixels with a nonzero strength.
    pub fn coverage(&self) -> f64 {
        let total = self.image.width() as u64 * self.image.height() as u64;
        if total == 0 {
            return 0.0;
        }
        let flagged = self.image.pixels().filter(|p| p[0] > 0.0).count();
        flagged as f64 / total as f64
    }

    pub fn to_raster(&self) -> RasterImage {
        RasterImage::from_float(self.image.clone())
    }
}
