// THEORY:
// Stage 6 draws the result for a human: the original image with a stroked circle
// around every spot, centered on the spot's rectangle with radius
// max(width, height) / 2. Drawing happens on an 8-bit copy; the source is never
// touched.
//
// The output carries the source's orientation tag. Pixels stay in the stored
// (unrotated) space the spots were measured in, so a viewer that honours the tag
// shows the markers exactly where they belong.

use crate::core_modules::raster::RasterImage;
use crate::core_modules::spot_extractor::BoundingSpot;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_circle_mut;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayConfig {
    /// RGBA stroke color.
    pub stroke_color: [u8; 4],
    /// Stroke width in pixels.
    pub stroke_width: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stroke_color: [255, 0, 0, 255],
            stroke_width: 2.0,
        }
    }
}

/// Radii of the concentric one-pixel rings that make up a stroke of `stroke_width`.
fn stroke_radii(radius: f64, stroke_width: f32) -> std::ops::Range<i32> {
    let half = (stroke_width.max(0.0) as f64) / 2.0;
    let inner = (radius - half).max(0.0).round() as i32;
    let outer = (radius + half).round() as i32;
    if outer > inner {
        inner..outer
    } else {
        let center = radius.round() as i32;
        center..center + 1
    }
}

fn draw_marker(canvas: &mut RgbaImage, spot: &BoundingSpot, config: &OverlayConfig) {
    let (cx, cy) = spot.center();
    let center = (cx.round() as i32, cy.round() as i32);
    let color = Rgba(config.stroke_color);
    for ring in stroke_radii(spot.marker_radius(), config.stroke_width) {
        draw_hollow_circle_mut(canvas, center, ring, color);
    }
}

/// Returns a copy of `image` with one circle per spot, tagged with the source orientation.
pub fn render_overlay(
    image: &RasterImage,
    spots: &[BoundingSpot],
    config: &OverlayConfig,
) -> RasterImage {
    let mut canvas = image.pixels().to_rgba8();
    for spot in spots {
        draw_marker(&mut canvas, spot, config);
    }
    RasterImage::new(DynamicImage::ImageRgba8(canvas)).with_orientation(image.orientation())
}
