// THEORY:
// This file is the main entry point for the `glare_vision` library crate. It
// exports the `pipeline` API (bright-spot detection, overlay rendering, true-glare
// masking) and its data structures (`GlareReport`, `BoundingSpot`, `GlareMask`,
// the config structs) as the high-level interface of the engine. The stage
// modules under `core_modules` stay public for callers that want to compose their
// own pipeline, but nothing outside `pipeline` is needed for the common path.

pub mod batch;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use crate::core_modules::glare_mask::GlareMask;
pub use crate::error::{GlareError, Stage};
pub use crate::pipeline::{
    BoundingSpot, BrightSpotConfig, GlareAnalysis, GlareConfig, GlareReport, Orientation,
    OverlayConfig, ProcessingContext, RasterImage, TrueGlareConfig, analyze, analyze_bytes,
    detect_bright_spots, detect_glare_hsv, detect_true_glare, render_overlay, try_detect_true_glare,
};
