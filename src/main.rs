// Example runner for the `glare_vision` library: marks the bright spots of one
// photo and, optionally, writes its true-glare mask.

use anyhow::{Context, Result};
use glare_vision::core_modules::utils::image_helper::image_helper::save_raster;
use glare_vision::{GlareConfig, ProcessingContext, RasterImage};
use std::env;
use std::path::Path;
use tracing::{Level, info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    // --- 1. Argument Parsing ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: glare_scan <input_image> <annotated_output.png> [mask_output.png]");
        return Ok(());
    }
    let input_path = Path::new(&args[1]);
    let output_path = Path::new(&args[2]);
    let mask_path = args.get(3).map(Path::new);

    // --- 2. Load ---
    let bytes = std::fs::read(input_path)
        .with_context(|| format!("reading {}", input_path.display()))?;

    // --- 3. Decode ---
    let context = ProcessingContext::cpu();
    let config = GlareConfig::default();
    let image = match RasterImage::decode(&bytes) {
        Ok(image) => image,
        Err(error) => {
            warn!(%error, "Input could not be decoded; nothing written");
            return Ok(());
        }
    };

    // --- 4. Analyze ---
    let analysis = context.analyze(&image, &config);
    for (index, spot) in analysis.report.spots.iter().enumerate() {
        info!(
            index,
            x = spot.x,
            y = spot.y,
            width = spot.width,
            height = spot.height,
            "Bright spot"
        );
    }
    info!(
        glare_detected = analysis.glare_detected(),
        spots = analysis.report.spots.len(),
        "Analysis complete"
    );

    let Some(annotated) = analysis.annotated else {
        warn!("Nothing to annotate; nothing written");
        return Ok(());
    };
    save_raster(output_path, &annotated)
        .with_context(|| format!("writing {}", output_path.display()))?;
    info!("Annotated image saved to {}", output_path.display());

    // --- 5. Optional True-Glare Mask ---
    if let Some(mask_path) = mask_path {
        match context.detect_true_glare(&image, &config.true_glare) {
            Some(mask) => {
                save_raster(mask_path, &mask.to_raster())
                    .with_context(|| format!("writing {}", mask_path.display()))?;
                info!(coverage = mask.coverage(), "Glare mask saved to {}", mask_path.display());
            }
            None => warn!("True glare mask unavailable"),
        }
    }

    Ok(())
}
