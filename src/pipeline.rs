// THEORY:
// The `pipeline` module is the top-level API of the glare engine. It strings the
// stage modules together into the two analyses a caller cares about:
//
// Pipeline A (spots):  grayscale -> blur -> range clamp -> contours -> spots
//                      and, on request, the overlay renderer.
// Pipeline B (mask):   HSV classifier x Sobel(grayscale) -> combined glare mask.
//
// Every call is a pure, synchronous, single-shot transform. Nothing is cached
// between calls, so the same `ProcessingContext` may serve any number of threads.
//
// Failure policy: Pipeline A never returns an error. A stage that fails stops
// the run, its predecessors' outputs are kept as diagnostics, the spot list is
// empty and `failed_stage` says where it stopped. A contour-tracing failure is
// treated exactly like "no contours". Pipeline B hands back `None` (or a
// `GlareError` through the `try_` variant).

use crate::core_modules::contour::ContourForest;
use crate::core_modules::contour_tracer::{TraceOptions, trace_contours};
use crate::core_modules::glare_mask::GlareMask;
use crate::core_modules::hsv_glare::HsvGlareParams;
use crate::core_modules::kernel::PixelKernel;
use crate::core_modules::mask_combiner::combine_masks;
use crate::core_modules::overlay;
use crate::core_modules::range_clamp::ClampRange;
use crate::core_modules::smoother::{smooth, validate_radius};
use crate::core_modules::spot_extractor::extract_spots;
use crate::error::{GlareError, Stage};
use std::time::Instant;
use tracing::{debug, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::context::ProcessingContext;
pub use crate::core_modules::overlay::OverlayConfig;
pub use crate::core_modules::raster::{FloatImage, Orientation, RasterImage};
pub use crate::core_modules::spot_extractor::BoundingSpot;

/// Tunables for Pipeline A.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrightSpotConfig {
    /// Gaussian sigma of the smoothing stage, in pixels.
    pub blur_radius: f32,
    /// Per-channel (r, g, b, a) floor of the range clamp.
    pub clamp_min: [f32; 4],
    /// Per-channel (r, g, b, a) ceiling of the range clamp.
    pub clamp_max: [f32; 4],
    /// The clamped image is downsampled so its largest side is at most this.
    pub contour_max_dimension: u32,
    /// Trace dark-on-light boundaries instead of bright-on-dark.
    pub detect_dark_on_light: bool,
    /// Emit spots for root contours only, folding nested contours into their parent.
    pub merge_nested_spots: bool,
    /// Binarization cut, as a fraction of the way from the clamp floor to its ceiling.
    pub contour_level: f32,
    /// Keep the grayscale, blurred and clamped buffers in the report.
    pub keep_diagnostics: bool,
}

impl Default for BrightSpotConfig {
    fn default() -> Self {
        let range = ClampRange::default();
        Self {
            blur_radius: 2.0,
            clamp_min: range.min,
            clamp_max: range.max,
            contour_max_dimension: 512,
            detect_dark_on_light: false,
            merge_nested_spots: false,
            contour_level: 0.5,
            keep_diagnostics: true,
        }
    }
}

impl BrightSpotConfig {
    pub fn clamp_range(&self) -> ClampRange {
        ClampRange {
            min: self.clamp_min,
            max: self.clamp_max,
        }
    }

    pub fn trace_options(&self) -> TraceOptions {
        let (floor, ceiling) = self.clamp_range().luminance_band();
        TraceOptions {
            max_dimension: self.contour_max_dimension,
            detect_dark_on_light: self.detect_dark_on_light,
            floor,
            ceiling,
            level: self.contour_level,
        }
    }
}

/// Tunables for Pipeline B.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrueGlareConfig {
    /// A pixel must have an HSV value strictly above this.
    pub value_threshold: f32,
    /// A pixel must have an HSV saturation strictly below this.
    pub saturation_limit: f32,
    /// Mask color of classified pixels.
    pub glare_color: [f32; 4],
    /// Mask color of everything else.
    pub background_color: [f32; 4],
    /// Optional smoothing of the grayscale image before edge detection. 0 disables it.
    pub edge_blur_radius: f32,
}

impl Default for TrueGlareConfig {
    fn default() -> Self {
        let params = HsvGlareParams::default();
        Self {
            value_threshold: params.value_threshold,
            saturation_limit: params.saturation_limit,
            glare_color: params.glare_color,
            background_color: params.background_color,
            edge_blur_radius: 0.0,
        }
    }
}

impl TrueGlareConfig {
    /// Red-on-black marking, for viewing the HSV classifier on its own.
    pub fn hsv_preview() -> Self {
        Self {
            glare_color: [1.0, 0.0, 0.0, 1.0],
            ..Self::default()
        }
    }

    pub fn hsv_params(&self) -> HsvGlareParams {
        HsvGlareParams {
            value_threshold: self.value_threshold,
            saturation_limit: self.saturation_limit,
            glare_color: self.glare_color,
            background_color: self.background_color,
        }
    }
}

/// Everything `analyze` needs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GlareConfig {
    pub spots: BrightSpotConfig,
    pub overlay: OverlayConfig,
    pub true_glare: TrueGlareConfig,
}

/// Intermediate buffers of Pipeline A, present up to the last stage that succeeded.
#[derive(Debug, Clone, Default)]
pub struct StageImages {
    pub grayscale: Option<FloatImage>,
    pub blurred: Option<FloatImage>,
    pub clamped: Option<FloatImage>,
}

/// The outcome of Pipeline A for one image.
#[derive(Debug, Clone, Default)]
pub struct GlareReport {
    /// One rectangle per contour, in pre-order of the contour forest.
    pub spots: Vec<BoundingSpot>,
    pub diagnostics: StageImages,
    failed_stage: Option<Stage>,
}

impl GlareReport {
    pub fn glare_detected(&self) -> bool {
        !self.spots.is_empty()
    }

    /// The stage that stopped the run, if any did.
    pub fn failed_stage(&self) -> Option<Stage> {
        self.failed_stage
    }

    fn failed(stage: Stage) -> Self {
        Self {
            failed_stage: Some(stage),
            ..Self::default()
        }
    }
}

/// Report plus annotated image, the full result of `analyze`.
#[derive(Debug, Clone)]
pub struct GlareAnalysis {
    pub report: GlareReport,
    /// `None` only when the input could not be interpreted as an image.
    pub annotated: Option<RasterImage>,
}

impl GlareAnalysis {
    pub fn glare_detected(&self) -> bool {
        self.report.glare_detected()
    }
}

impl ProcessingContext {
    /// Runs Pipeline A. Never fails; see the module notes for how failures degrade.
    pub fn detect_bright_spots(
        &self,
        image: &RasterImage,
        config: &BrightSpotConfig,
    ) -> GlareReport {
        let started = Instant::now();
        let mut report = GlareReport::default();
        if let Err(error) = self.run_spot_stages(image, config, &mut report) {
            warn!(%error, "Bright spot detection stopped early");
            report.spots.clear();
            report.failed_stage = error.stage();
        }
        debug!(
            width = image.width(),
            height = image.height(),
            spots = report.spots.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Bright spot detection finished"
        );
        report
    }

    fn run_spot_stages(
        &self,
        image: &RasterImage,
        config: &BrightSpotConfig,
        report: &mut GlareReport,
    ) -> Result<(), GlareError> {
        image.ensure_not_empty()?;
        let keep = config.keep_diagnostics;
        let source = image.to_float();

        // Stage 1: Grayscale
        let gray = self
            .grayscale
            .apply(&source, &())
            .map_err(|e| GlareError::stage_unavailable(Stage::Grayscale, e.to_string()))?;

        // Stage 2: Smoothing
        let blurred = smooth(&gray, config.blur_radius);
        if keep {
            report.diagnostics.grayscale = Some(gray);
        }
        let blurred = blurred?;

        // Stage 3: Range Clamp
        let clamped = self.clamp.apply(&blurred, &config.clamp_range());
        if keep {
            report.diagnostics.blurred = Some(blurred);
        }
        let clamped = clamped?;

        // Stage 4: Contour Tracing. A failure here is the same as finding nothing.
        let forest = match trace_contours(&clamped, &config.trace_options()) {
            Ok(forest) => forest,
            Err(error) => {
                warn!(%error, "Contour tracing failed, reporting no contours");
                report.failed_stage = Some(Stage::Contours);
                ContourForest::new()
            }
        };
        if keep {
            report.diagnostics.clamped = Some(clamped);
        }

        // Stage 5: Spot Extraction
        report.spots = extract_spots(
            &forest,
            image.width(),
            image.height(),
            config.merge_nested_spots,
        );
        debug!(contours = forest.len(), spots = report.spots.len(), "Extracted bright spots");
        Ok(())
    }

    /// Stage 6: draws the spots over a copy of `image`.
    pub fn render_overlay(
        &self,
        image: &RasterImage,
        spots: &[BoundingSpot],
        config: &OverlayConfig,
    ) -> RasterImage {
        overlay::render_overlay(image, spots, config)
    }

    /// Runs Pipeline B, returning the error instead of logging it.
    pub fn try_detect_true_glare(
        &self,
        image: &RasterImage,
        config: &TrueGlareConfig,
    ) -> Result<GlareMask, GlareError> {
        image.ensure_not_empty()?;
        let source = image.to_float();

        let edge_blur = |error: GlareError| GlareError::kernel("edge_blur", error.to_string());
        validate_radius(config.edge_blur_radius).map_err(edge_blur)?;

        let glare = self.hsv.apply(&source, &config.hsv_params())?;
        let gray = self.grayscale.apply(&source, &())?;
        let gray = if config.edge_blur_radius > 0.0 {
            smooth(&gray, config.edge_blur_radius).map_err(edge_blur)?
        } else {
            gray
        };
        let edges = self.sobel.apply(&gray, &())?;
        let mask = combine_masks(&glare, &edges)?;
        debug!(coverage = mask.coverage(), "Combined glare and edge masks");
        Ok(mask)
    }

    /// Runs Pipeline B. `None` means a kernel could not run; the reason is logged.
    pub fn detect_true_glare(
        &self,
        image: &RasterImage,
        config: &TrueGlareConfig,
    ) -> Option<GlareMask> {
        self.try_detect_true_glare(image, config)
            .inspect_err(|error| warn!(%error, "True glare detection produced no result"))
            .ok()
    }

    /// Runs only the HSV classifier, without edge refinement.
    pub fn detect_glare_hsv(
        &self,
        image: &RasterImage,
        config: &TrueGlareConfig,
    ) -> Option<GlareMask> {
        let run = || -> Result<GlareMask, GlareError> {
            image.ensure_not_empty()?;
            let mask = self.hsv.apply(&image.to_float(), &config.hsv_params())?;
            Ok(GlareMask::new(mask))
        };
        run()
            .inspect_err(|error| warn!(%error, "HSV glare detection produced no result"))
            .ok()
    }

    /// Detects spots then renders them, the complete single-photo flow.
    pub fn analyze(&self, image: &RasterImage, config: &GlareConfig) -> GlareAnalysis {
        if let Err(error) = image.ensure_not_empty() {
            warn!(%error, "Nothing to analyze");
            return GlareAnalysis {
                report: GlareReport::failed(Stage::Decode),
                annotated: None,
            };
        }
        let report = self.detect_bright_spots(image, &config.spots);
        let annotated = self.render_overlay(image, &report.spots, &config.overlay);
        GlareAnalysis {
            report,
            annotated: Some(annotated),
        }
    }

    /// Decodes an encoded photo and analyzes it. Undecodable input yields an empty report.
    pub fn analyze_bytes(&self, bytes: &[u8], config: &GlareConfig) -> GlareAnalysis {
        match RasterImage::decode(bytes) {
            Ok(image) => self.analyze(&image, config),
            Err(error) => {
                warn!(%error, "Input is not a processable image");
                GlareAnalysis {
                    report: GlareReport::failed(Stage::Decode),
                    annotated: None,
                }
            }
        }
    }
}

/// Runs Pipeline A with a context scoped to this call.
pub fn detect_bright_spots(image: &RasterImage, config: &BrightSpotConfig) -> GlareReport {
    ProcessingContext::cpu().detect_bright_spots(image, config)
}

pub fn render_overlay(
    image: &RasterImage,
    spots: &[BoundingSpot],
    config: &OverlayConfig,
) -> RasterImage {
    ProcessingContext::cpu().render_overlay(image, spots, config)
}

pub fn detect_true_glare(image: &RasterImage, config: &TrueGlareConfig) -> Option<GlareMask> {
    ProcessingContext::cpu().detect_true_glare(image, config)
}

pub fn try_detect_true_glare(
    image: &RasterImage,
    config: &TrueGlareConfig,
) -> Result<GlareMask, GlareError> {
    ProcessingContext::cpu().try_detect_true_glare(image, config)
}

pub fn detect_glare_hsv(image: &RasterImage, config: &TrueGlareConfig) -> Option<GlareMask> {
    ProcessingContext::cpu().detect_glare_hsv(image, config)
}

pub fn analyze(image: &RasterImage, config: &GlareConfig) -> GlareAnalysis {
    ProcessingContext::cpu().analyze(image, config)
}

pub fn analyze_bytes(bytes: &[u8], config: &GlareConfig) -> GlareAnalysis {
    ProcessingContext::cpu().analyze_bytes(bytes, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};

    fn spot_image() -> RasterImage {
        let buffer = RgbaImage::from_fn(96, 64, |x, y| {
            let (dx, dy) = (x as i32 - 30, y as i32 - 20);
            if dx * dx + dy * dy <= 64 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([20, 30, 40, 255])
            }
        });
        RasterImage::new(DynamicImage::ImageRgba8(buffer))
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = GlareConfig::default();
        assert_eq!(config.spots.blur_radius, 2.0);
        assert_eq!(config.spots.clamp_min, [0.9, 0.9, 0.9, 1.0]);
        assert_eq!(config.spots.clamp_max, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(config.spots.contour_max_dimension, 512);
        assert!(!config.spots.detect_dark_on_light);
        assert!(!config.spots.merge_nested_spots);
        assert_eq!(config.overlay.stroke_color, [255, 0, 0, 255]);
        assert_eq!(config.overlay.stroke_width, 2.0);
        assert_eq!(config.true_glare.value_threshold, 0.9);
        assert_eq!(config.true_glare.saturation_limit, 0.2);
    }

    #[test]
    fn diagnostics_are_kept_on_success() {
        let report = detect_bright_spots(&spot_image(), &BrightSpotConfig::default());
        assert_eq!(report.spots.len(), 1);
        assert!(report.failed_stage().is_none());
        assert!(report.diagnostics.grayscale.is_some());
        assert!(report.diagnostics.blurred.is_some());
        assert!(report.diagnostics.clamped.is_some());
    }

    #[test]
    fn diagnostics_can_be_dropped() {
        let config = BrightSpotConfig {
            keep_diagnostics: false,
            ..BrightSpotConfig::default()
        };
        let report = detect_bright_spots(&spot_image(), &config);
        assert!(report.glare_detected());
        assert!(report.diagnostics.grayscale.is_none());
        assert!(report.diagnostics.clamped.is_none());
    }

    #[test]
    fn blur_failure_keeps_grayscale_only() {
        let config = BrightSpotConfig {
            blur_radius: f32::NAN,
            ..BrightSpotConfig::default()
        };
        let report = detect_bright_spots(&spot_image(), &config);
        assert!(!report.glare_detected());
        assert_eq!(report.failed_stage(), Some(Stage::Blur));
        assert!(report.diagnostics.grayscale.is_some());
        assert!(report.diagnostics.blurred.is_none());
    }

    #[test]
    fn clamp_failure_keeps_blurred() {
        let config = BrightSpotConfig {
            clamp_min: [1.0, 1.0, 1.0, 1.0],
            clamp_max: [0.5, 0.5, 0.5, 1.0],
            ..BrightSpotConfig::default()
        };
        let report = detect_bright_spots(&spot_image(), &config);
        assert!(report.spots.is_empty());
        assert_eq!(report.failed_stage(), Some(Stage::Clamp));
        assert!(report.diagnostics.blurred.is_some());
        assert!(report.diagnostics.clamped.is_none());
    }

    #[test]
    fn tracing_failure_is_zero_contours() {
        let config = BrightSpotConfig {
            contour_max_dimension: 0,
            ..BrightSpotConfig::default()
        };
        let report = detect_bright_spots(&spot_image(), &config);
        assert!(report.spots.is_empty());
        assert_eq!(report.failed_stage(), Some(Stage::Contours));
        assert!(report.diagnostics.clamped.is_some());
    }

    #[test]
    fn undecodable_bytes_give_no_annotated_image() {
        let analysis = analyze_bytes(b"definitely not a png", &GlareConfig::default());
        assert!(!analysis.glare_detected());
        assert!(analysis.annotated.is_none());
        assert_eq!(analysis.report.failed_stage(), Some(Stage::Decode));
    }

    #[test]
    fn empty_image_is_a_decode_failure() {
        let empty = RasterImage::new(DynamicImage::ImageRgba8(RgbaImage::new(0, 0)));
        let analysis = analyze(&empty, &GlareConfig::default());
        assert!(analysis.annotated.is_none());
        assert!(detect_true_glare(&empty, &TrueGlareConfig::default()).is_none());
    }

    #[test]
    fn analyze_renders_with_source_orientation() {
        let image = spot_image().with_orientation(Orientation::Right);
        let analysis = analyze(&image, &GlareConfig::default());
        assert!(analysis.glare_detected());
        let annotated = analysis.annotated.expect("annotated image");
        assert_eq!(annotated.orientation(), Orientation::Right);
    }

    #[test]
    fn hsv_preview_marks_in_red() {
        let white = ImageBuffer::from_pixel(2, 2, Rgba([1.0, 1.0, 1.0, 1.0]));
        let image = RasterImage::from_float(white);
        let mask = detect_glare_hsv(&image, &TrueGlareConfig::hsv_preview()).unwrap();
        assert_eq!(mask.image().get_pixel(0, 0), &Rgba([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn invalid_threshold_yields_no_mask() {
        let image = spot_image();
        let config = TrueGlareConfig {
            saturation_limit: f32::INFINITY,
            ..TrueGlareConfig::default()
        };
        assert!(detect_true_glare(&image, &config).is_none());
        assert!(matches!(
            try_detect_true_glare(&image, &config),
            Err(GlareError::Kernel { .. })
        ));
    }

    #[test]
    fn subnormal_blur_radius_is_a_blur_failure() {
        for blur_radius in [1e-40, f32::MIN_POSITIVE / 2.0] {
            let config = BrightSpotConfig {
                blur_radius,
                ..BrightSpotConfig::default()
            };
            let report = detect_bright_spots(&spot_image(), &config);
            assert!(report.spots.is_empty());
            assert_eq!(report.failed_stage(), Some(Stage::Blur));
            assert!(report.diagnostics.grayscale.is_some());
        }
    }

    #[test]
    fn invalid_edge_blur_radius_yields_no_mask() {
        let image = spot_image();
        for edge_blur_radius in [f32::NAN, 1e-40, -1.0, f32::INFINITY] {
            let config = TrueGlareConfig {
                edge_blur_radius,
                ..TrueGlareConfig::default()
            };
            assert!(detect_true_glare(&image, &config).is_none());
            assert!(matches!(
                try_detect_true_glare(&image, &config),
                Err(GlareError::Kernel { kernel: "edge_blur", .. })
            ));
        }
    }

    #[test]
    fn positive_edge_blur_radius_still_masks() {
        let config = TrueGlareConfig {
            edge_blur_radius: 1.0,
            ..TrueGlareConfig::default()
        };
        let mask = detect_true_glare(&spot_image(), &config).expect("mask");
        assert!(mask.coverage() > 0.0);
    }

    #[test]
    fn one_decode_serves_both_pipelines() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        spot_image()
            .pixels()
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let bytes = bytes.into_inner();

        let image = RasterImage::decode(&bytes).unwrap();
        let config = GlareConfig::default();
        let analysis = analyze(&image, &config);
        assert_eq!(analysis.report.spots, analyze_bytes(&bytes, &config).report.spots);
        assert!(detect_true_glare(&image, &config.true_glare).is_some());
    }
}
