// THEORY:
// `RasterImage` is the unit of exchange between the engine and its callers. It is a
// "dumb" container: an owned pixel buffer plus the orientation tag the photo was
// captured with. Stages never rotate pixels; they work in the buffer's own pixel
// space and the tag travels alongside untouched, so a renderer can hand back an
// image that displays exactly like its input.
//
// Internally every stage works on `FloatImage` (RGBA, f32 channels in [0, 1]).
// Single-channel intermediates (luminance, edge magnitude, masks) are stored
// RGB-encoded: r = g = b, alpha passed through.

use crate::error::GlareError;
use image::{DynamicImage, ImageBuffer, Rgba};

/// RGBA buffer with f32 channels, the working format of every stage.
pub type FloatImage = ImageBuffer<Rgba<f32>, Vec<f32>>;

/// How the stored pixels must be transformed to display upright (EXIF semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl Orientation {
    /// Maps an EXIF orientation value (1..=8). Unknown values fall back to `Up`.
    pub fn from_exif(value: u16) -> Self {
        match value {
            2 => Orientation::UpMirrored,
            3 => Orientation::Down,
            4 => Orientation::DownMirrored,
            5 => Orientation::LeftMirrored,
            6 => Orientation::Right,
            7 => Orientation::RightMirrored,
            8 => Orientation::Left,
            _ => Orientation::Up,
        }
    }

    pub fn to_exif(self) -> u16 {
        match self {
            Orientation::Up => 1,
            Orientation::UpMirrored => 2,
            Orientation::Down => 3,
            Orientation::DownMirrored => 4,
            Orientation::LeftMirrored => 5,
            Orientation::Right => 6,
            Orientation::RightMirrored => 7,
            Orientation::Left => 8,
        }
    }

    /// True for the tags that swap width and height on display.
    pub fn is_rotated_quarter(self) -> bool {
        matches!(
            self,
            Orientation::Left
                | Orientation::Right
                | Orientation::LeftMirrored
                | Orientation::RightMirrored
        )
    }
}

/// A photo (or any stage output) with exclusive ownership of its pixels.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: DynamicImage,
    orientation: Orientation,
}

impl RasterImage {
    pub fn new(pixels: DynamicImage) -> Self {
        Self {
            pixels,
            orientation: Orientation::Up,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Decodes an encoded photo (PNG, JPEG, ...). The orientation tag starts as `Up`.
    pub fn decode(bytes: &[u8]) -> Result<Self, GlareError> {
        let pixels = image::load_from_memory(bytes)?;
        let image = Self::new(pixels);
        image.ensure_not_empty()?;
        Ok(image)
    }

    pub fn from_float(buffer: FloatImage) -> Self {
        Self::new(DynamicImage::ImageRgba32F(buffer))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> DynamicImage {
        self.pixels
    }

    /// Copies the pixels into the f32 working format.
    pub fn to_float(&self) -> FloatImage {
        self.pixels.to_rgba32f()
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<(), GlareError> {
        if self.width() == 0 || self.height() == 0 {
            return Err(GlareError::EmptyImage {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(pixels: DynamicImage) -> Self {
        Self::new(pixels)
    }
}
