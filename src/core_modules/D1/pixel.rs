// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the glare engine. It is a
// "dumb" data container for a single RGBA pixel with f32 channels in [0, 1] plus
// the handful of 1-dimensional heuristics the classifiers need: metrics computed
// from this pixel alone, with no knowledge of neighbours. Anything that samples a
// neighbourhood (blur, Sobel, contour tracing) belongs in the stage modules.
//
// Heuristic families (all single-pixel):
// - Brightness:     luminance (Rec. 601), HSV value (max channel)
// - Color strength: chroma (max - min), saturation_HSV (chroma / value)
//
// Key principles:
// 1) Single-pixel scope (1D): heuristics never read neighbours.
// 2) The same definitions back every kernel, so the grayscale stage, the HSV
//    classifier and the contour binarizer agree on what "bright" means.

pub mod pixel {
    use image::Rgba;

    pub type Channel = f32;
    pub type Luminance = f32;
    pub type ValueHSV = f32;
    pub type SaturationHSV = f32;
    pub type Chroma = f32;

    /// Rec. 601 luma weights, the "standard perceptual weighting".
    pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// A gray pixel with every color channel set to `level`.
        pub fn gray(level: Channel, alpha: Channel) -> Self {
            Pixel::new(level, level, level, alpha)
        }

        /// =================================Heuristics==================================

        /// Luminance estimate (Rec. 601 luma).
        pub fn luminance(&self) -> Luminance {
            LUMA_WEIGHTS[0] * self.red + LUMA_WEIGHTS[1] * self.green + LUMA_WEIGHTS[2] * self.blue
        }

        /// HSV Value (V): brightness defined as max(R, G, B).
        pub fn value_hsv(&self) -> ValueHSV {
            self.red.max(self.green.max(self.blue))
        }

        fn minimum_channel(&self) -> Channel {
            self.red.min(self.green.min(self.blue))
        }

        /// Chroma (C): max(R,G,B) - min(R,G,B). Zero for perfect gray.
        pub fn chroma(&self) -> Chroma {
            self.value_hsv() - self.minimum_channel()
        }

        /// Saturation (HSV): S = chroma / value, defined as 0 for black.
        pub fn saturation_hsv(&self) -> SaturationHSV {
            let value = self.value_hsv();
            if value == 0.0 {
                return 0.0;
            }
            self.chroma() / value
        }
    }

    impl From<&Rgba<f32>> for Pixel {
        fn from(rgba: &Rgba<f32>) -> Self {
            Pixel::new(rgba[0], rgba[1], rgba[2], rgba[3])
        }
    }

    impl From<Pixel> for Rgba<f32> {
        fn from(pixel: Pixel) -> Self {
            Rgba([pixel.red, pixel.green, pixel.blue, pixel.alpha])
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn white_is_bright_and_unsaturated() {
            let white = Pixel::gray(1.0, 1.0);
            assert!((white.luminance() - 1.0).abs() < 1e-6);
            assert_eq!(white.value_hsv(), 1.0);
            assert_eq!(white.saturation_hsv(), 0.0);
        }

        #[test]
        fn black_saturation_is_guarded() {
            let black = Pixel::new(0.0, 0.0, 0.0, 1.0);
            assert_eq!(black.saturation_hsv(), 0.0);
            assert_eq!(black.chroma(), 0.0);
        }

        #[test]
        fn pure_red_is_fully_saturated() {
            let red = Pixel::new(1.0, 0.0, 0.0, 1.0);
            assert_eq!(red.value_hsv(), 1.0);
            assert_eq!(red.saturation_hsv(), 1.0);
            assert!((red.luminance() - 0.299).abs() < 1e-6);
        }

        #[test]
        fn pale_tint_has_low_saturation() {
            let pale = Pixel::new(1.0, 0.95, 0.9, 1.0);
            assert!((pale.saturation_hsv() - 0.1).abs() < 1e-5);
        }
    }
}

// -----------------------------------------------------------------------------
// Glossary: Single-Pixel Color Terms (1D)
//
// - Luminance: perceived brightness, weighted sum 0.299 R + 0.587 G + 0.114 B.
//
// - Value (HSV): the maximum of the RGB channels. High Value means the pixel is
//   bright regardless of colorfulness.
//
// - Chroma: max(R,G,B) - min(R,G,B). Zero means perfectly gray.
//
// - Saturation (HSV): chroma divided by Value. Bright and desaturated pixels are
//   the signature of specular glare; bright and saturated ones are colored lights.
