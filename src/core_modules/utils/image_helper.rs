pub mod image_helper {
    use crate::core_modules::raster::{FloatImage, RasterImage};
    use image::{DynamicImage, ImageEncoder};
    use std::path::Path;

    /// Writes an 8-bit RGBA buffer as PNG.
    pub fn save(
        path: &Path,
        width: u32,
        height: u32,
        buffer: &[u8],
    ) -> Result<(), image::error::ImageError> {
        let output = std::io::BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        Ok(())
    }

    /// Writes a stage buffer as PNG, clamping channels into [0, 1] first.
    pub fn save_float(path: &Path, image: &FloatImage) -> Result<(), image::error::ImageError> {
        let rgba = DynamicImage::ImageRgba32F(image.clone()).to_rgba8();
        save(path, rgba.width(), rgba.height(), rgba.as_raw())
    }

    pub fn save_raster(path: &Path, image: &RasterImage) -> Result<(), image::error::ImageError> {
        let rgba = image.pixels().to_rgba8();
        save(path, rgba.width(), rgba.height(), rgba.as_raw())
    }
}

#[cfg(test)]
mod tests {

    use super::image_helper::*;
    use crate::core_modules::raster::{FloatImage, RasterImage};
    use image::{ImageBuffer, Rgba};

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("glare_vision_{}_{name}", std::process::id()))
    }

    #[test]
    fn save_gradient_file_round_trips() {
        let width = 64u32;
        let height = 32u32;
        let mut buffer = vec![255u8; (width * height * 4) as usize];
        let mut intensity = 0u8;

        for i in buffer.chunks_mut(4) {
            i[0] = intensity;
            i[1] = intensity;
            i[2] = intensity;
            intensity = intensity.wrapping_add(1);
        }

        let path = scratch("gradient.png");
        save(&path, width, height, &buffer).expect("Error Saving File.");
        let loaded = image::open(&path).expect("Error Loading File.").to_rgba8();
        assert_eq!(loaded.dimensions(), (width, height));
        assert_eq!(loaded.as_raw(), &buffer);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn save_float_clamps_out_of_range_values() {
        let image: FloatImage = ImageBuffer::from_fn(4, 4, |x, _| {
            let level = x as f32;
            Rgba([level, level, level, 1.0])
        });
        let path = scratch("edges.png");
        save_float(&path, &image).expect("Error Saving File.");
        let loaded = image::open(&path).expect("Error Loading File.").to_rgba8();
        assert_eq!(loaded.get_pixel(0, 0)[0], 0);
        assert_eq!(loaded.get_pixel(3, 0)[0], 255);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn save_raster_writes_stored_pixels() {
        let green = ImageBuffer::from_pixel(3, 5, Rgba([0.0, 1.0, 0.0, 1.0]));
        let image = RasterImage::from_float(green);
        let path = scratch("raster.png");
        save_raster(&path, &image).expect("Error Saving File.");
        let loaded = image::open(&path).expect("Error Loading File.").to_rgba8();
        assert_eq!(loaded.dimensions(), (3, 5));
        assert_eq!(loaded.get_pixel(1, 1), &Rgba([0, 255, 0, 255]));
        let _ = std::fs::remove_file(path);
    }
}
