// THEORY:
// Stage 9 fuses the HSV glare mask with the Sobel edge map by per-pixel
// multiplication. Real glare sits on or near an intensity edge (the rim of a
// reflection); flat, featureless bright areas such as an overexposed sky pass
// the HSV test but have no gradient, so the product suppresses them. A pixel is
// flagged iff both inputs are nonzero there.

use crate::core_modules::glare_mask::GlareMask;
use crate::core_modules::raster::FloatImage;
use crate::error::GlareError;
use image::{ImageBuffer, Rgba};

/// Multiplies `glare` by `edges` channel-wise, keeping RGB in [0, 1] and alpha opaque.
pub fn combine_masks(glare: &FloatImage, edges: &FloatImage) -> Result<GlareMask, GlareError> {
    if glare.dimensions() != edges.dimensions() {
        return Err(GlareError::DimensionMismatch {
            left: glare.dimensions(),
            right: edges.dimensions(),
        });
    }
    let combined = ImageBuffer::from_fn(glare.width(), glare.height(), |x, y| {
        let a = glare.get_pixel(x, y);
        let b = edges.get_pixel(x, y);
        let channel = |i: usize| (a[i] * b[i]).clamp(0.0, 1.0);
        Rgba([channel(0), channel(1), channel(2), 1.0])
    });
    Ok(GlareMask::new(combined))
}
