// THEORY:
// Stage 5 flattens the contour forest into the `BoundingSpot` list the report
// carries. It is a stateless utility.
//
// Every node at every depth yields its own spot by default: the hole inside a
// bright ring and the highlight inside that hole each get a marker. That can
// report one visual blob several times, so `merge_nested` keeps only root
// contours when a caller prefers one marker per blob.
//
// Coordinate reconciliation: contour space is normalized with a bottom-left
// origin, pixel space has a top-left origin. The vertical flip is
//
//     pixel_y = (1 - y0 - h0) * H
//
// and results are clipped to the image rectangle so numeric drift never yields a
// spot outside the source image.

use crate::core_modules::contour::{ContourForest, NormalizedRect};

/// Axis-aligned rectangle in pixel coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingSpot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingSpot {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Radius of the marker circle drawn around this spot.
    pub fn marker_radius(&self) -> f64 {
        self.width.max(self.height) / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when `other` lies entirely inside this rectangle (edges inclusive).
    pub fn contains(&self, other: &BoundingSpot) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Maps a normalized, bottom-left-origin rectangle into pixel space, unclipped.
pub fn to_pixel_space(rect: &NormalizedRect, width: u32, height: u32) -> BoundingSpot {
    let (w, h) = (width as f64, height as f64);
    BoundingSpot {
        x: rect.x * w,
        y: (1.0 - rect.y - rect.height) * h,
        width: rect.width * w,
        height: rect.height * h,
    }
}

/// Clips a spot to `[0, width] x [0, height]`.
pub fn clip_to_image(spot: BoundingSpot, width: u32, height: u32) -> BoundingSpot {
    let (w, h) = (width as f64, height as f64);
    let x0 = spot.x.clamp(0.0, w);
    let y0 = spot.y.clamp(0.0, h);
    let x1 = (spot.x + spot.width).clamp(0.0, w);
    let y1 = (spot.y + spot.height).clamp(0.0, h);
    BoundingSpot {
        x: x0,
        y: y0,
        width: (x1 - x0).max(0.0),
        height: (y1 - y0).max(0.0),
    }
}

/// Flattens the forest in pre-order into pixel-space spots for a `width x height` image.
pub fn extract_spots(
    forest: &ContourForest,
    width: u32,
    height: u32,
    merge_nested: bool,
) -> Vec<BoundingSpot> {
    forest
        .pre_order()
        .filter(|(_, contour)| !merge_nested || contour.parent.is_none())
        .filter_map(|(_, contour)| contour.bounding_box())
        .map(|rect| clip_to_image(to_pixel_space(&rect, width, height), width, height))
        .collect()
}
