#[allow(non_snake_case)]
pub mod D1 {
    pub mod pixel;
}

pub mod context;
pub mod contour;
pub mod contour_tracer;
pub mod glare_mask;
pub mod grayscale;
pub mod hsv_glare;
pub mod kernel;
pub mod mask_combiner;
pub mod overlay;
pub mod range_clamp;
pub mod raster;
pub mod smoother;
pub mod sobel;
pub mod spot_extractor;
pub mod utils;
