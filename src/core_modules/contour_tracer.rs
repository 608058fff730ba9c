// THEORY:
// Stage 4 turns the clamped image into a `ContourForest`. It is the bridge between
// the pixel-level filters and the geometric layer.
//
// Algorithm steps:
// 1.  **Downsample**: shrink so the largest side is at most `max_dimension`. Output
//     coordinates are normalized, so this only costs precision, never position.
// 2.  **Binarize**: a pixel is foreground when its luminance sits above `level`
//     of the way from the clamp floor to the clamp ceiling (or at/below it, when
//     tracing dark-on-light). Since the clamp raised everything dark to the floor,
//     this splits near-maximum pixels from floor-valued ones.
// 3.  **Border Following**: Suzuki-Abe border following (`imageproc::contours`)
//     yields outer borders and hole borders with their containing border as parent.
// 4.  **Normalize**: each border pixel becomes its pixel center divided by the
//     traced size, flipped to a bottom-left origin.
//
// No closed contour is not a failure: the forest is simply empty.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::contour::{ContourForest, ContourKind, NormalizedPoint};
use crate::core_modules::raster::FloatImage;
use crate::error::GlareError;
use image::{GrayImage, Luma, imageops};
use imageproc::contours::{BorderType, find_contours};
use tracing::debug;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceOptions {
    /// Largest side of the image handed to border following.
    pub max_dimension: u32,
    /// Trace dark regions on a bright background instead of the reverse.
    pub detect_dark_on_light: bool,
    /// Luminance of the clamp floor.
    pub floor: f32,
    /// Luminance of the clamp ceiling.
    pub ceiling: f32,
    /// Position of the binarization cut between floor (0.0) and ceiling (1.0).
    pub level: f32,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            detect_dark_on_light: false,
            floor: 0.9,
            ceiling: 1.0,
            level: 0.5,
        }
    }
}

impl TraceOptions {
    fn cut(&self) -> f32 {
        self.floor + (self.ceiling - self.floor) * self.level.clamp(0.0, 1.0)
    }
}

/// Size of the traced image: the largest side capped at `max_dimension`.
pub fn traced_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_dimension {
        return (width, height);
    }
    let scale = max_dimension as f64 / largest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
    (scaled(width), scaled(height))
}

/// Foreground/background mask of the clamped image at traced resolution.
pub fn binarize(clamped: &FloatImage, options: &TraceOptions) -> GrayImage {
    let cut = options.cut();
    GrayImage::from_fn(clamped.width(), clamped.height(), |x, y| {
        let luma = Pixel::from(clamped.get_pixel(x, y)).luminance();
        let bright = luma > cut;
        if bright != options.detect_dark_on_light {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Extracts the nested contour forest from a clamped image.
pub fn trace_contours(
    clamped: &FloatImage,
    options: &TraceOptions,
) -> Result<ContourForest, GlareError> {
    if options.max_dimension == 0 {
        return Err(GlareError::Analysis("contour max dimension must be positive".into()));
    }
    if !(options.floor.is_finite() && options.ceiling.is_finite() && options.level.is_finite()) {
        return Err(GlareError::Analysis("binarization band must be finite".into()));
    }
    if clamped.width() == 0 || clamped.height() == 0 {
        return Err(GlareError::Analysis("clamped image is empty".into()));
    }

    let (width, height) = traced_size(clamped.width(), clamped.height(), options.max_dimension);
    let binary = if (width, height) == clamped.dimensions() {
        binarize(clamped, options)
    } else {
        let reduced = imageops::resize(clamped, width, height, imageops::FilterType::Triangle);
        binarize(&reduced, options)
    };

    let traced = find_contours::<i32>(&binary);
    debug!(
        traced_width = width,
        traced_height = height,
        contours = traced.len(),
        "Traced clamped image"
    );

    let (w, h) = (width as f64, height as f64);
    let forest = ContourForest::from_traced(traced.into_iter().map(|contour| {
        let path = contour
            .points
            .iter()
            .map(|p| NormalizedPoint {
                x: ((p.x as f64 + 0.5) / w).clamp(0.0, 1.0),
                y: (1.0 - (p.y as f64 + 0.5) / h).clamp(0.0, 1.0),
            })
            .collect();
        let kind = match contour.border_type {
            BorderType::Outer => ContourKind::Outer,
            BorderType::Hole => ContourKind::Hole,
        };
        (path, kind, contour.parent)
    }));
    Ok(forest)
}
