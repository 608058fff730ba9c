// THEORY:
// Stage 2. Denoises luminance before the range clamp so that isolated hot pixels
// (sensor noise, JPEG ringing) do not survive as one-pixel "spots". The blur is
// the separable Gaussian from `image::imageops`, with edge pixels replicated.
//
// The radius is treated as the Gaussian sigma. Larger radii merge neighbouring
// highlights and shrink very small ones below the clamp floor, so it stays a
// configuration value.

use crate::core_modules::raster::FloatImage;
use crate::error::{GlareError, Stage};
use image::imageops;
use tracing::debug;

/// Blurs `image` with a Gaussian of the given radius.
///
/// A radius of exactly zero is a no-op. Negative, subnormal or non-finite radii
/// are a stage failure. Radii above the image's largest side are capped to it.
pub fn smooth(image: &FloatImage, radius: f32) -> Result<FloatImage, GlareError> {
    validate_radius(radius)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(GlareError::stage_unavailable(Stage::Blur, "input image is empty"));
    }
    if radius == 0.0 {
        return Ok(image.clone());
    }
    let largest = image.width().max(image.height()) as f32;
    let sigma = radius.min(largest);
    if sigma < radius {
        debug!(radius, sigma, "Blur radius capped to the image size");
    }
    Ok(imageops::blur(image, sigma))
}

/// Accepts zero or a normal, positive, finite radius.
pub fn validate_radius(radius: f32) -> Result<(), GlareError> {
    if radius == 0.0 || (radius.is_normal() && radius > 0.0) {
        return Ok(());
    }
    Err(GlareError::stage_unavailable(
        Stage::Blur,
        format!("blur radius must be zero or a positive normal number, got {radius}"),
    ))
}
