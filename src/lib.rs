//! A library to tally the dominant colors of an image.
//!
//! The heart of the crate is a median-cut quantizer: the opaque pixels of an
//! RGBA image are recursively partitioned into at most `max_colors` buckets by
//! splitting the most color-diverse bucket along its dominant channel at the
//! median, and each final bucket collapses to its average color. The result is
//! a [`ColorCounts`] mapping each palette color to the number of source pixels
//! it represents, ready for display sorting and CSV/JSON/palette-image export.
//!
//! The quantizer is a pure, synchronous function: identical input and
//! `max_colors` always produce an identical tally. Callers that must stay
//! responsive on very large images can run it on their own worker thread.
//!
//! ```no_run
//! use colortally::{ColorCounts, SortOrder};
//!
//! let image = colortally::image::open("photo.png").unwrap().to_rgba8();
//! let counts = ColorCounts::from_image(image).max_colors(8).generate().unwrap();
//!
//! for swatch in counts.sorted(SortOrder::CountDesc) {
//!     println!("{} covers {} pixels", swatch.hex(), swatch.count());
//! }
//! ```

mod error;
mod export;
mod median_cut;
mod sort;
mod swatch;

/// Palette size used when the builder is not told otherwise.
pub const DEFAULT_MAX_COLORS: usize = 16;

pub use crate::{
    error::Error,
    export::{
        palette_image, records, to_csv, to_json, ColorRecord, HslRecord, PaletteExport,
        RgbRecord, DEFAULT_SWATCH_SIZE,
    },
    median_cut::quantize,
    sort::SortOrder,
    swatch::Swatch,
};
pub use image;
pub use palette;

use image::RgbaImage;
use palette::IntoColor;
use std::collections::HashMap;

/// The result of one quantization: at most `max_colors` palette entries, each
/// an average color with the number of source pixels it represents.
///
/// The entries sum to the number of non-transparent pixels in the quantized
/// input and sit in a deterministic order, so two tallies of identical input
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCounts {
    swatches: Vec<Swatch>,
    total_pixels: u64,
}

pub struct ColorCountsBuilder {
    image: RgbaImage,
    max_colors: usize,
    resize_area: u32,
}

impl ColorCounts {
    pub fn from_image(image: RgbaImage) -> ColorCountsBuilder {
        ColorCountsBuilder::from_image(image)
    }

    pub(crate) fn from_swatches(swatches: Vec<Swatch>) -> Self {
        let total_pixels = swatches.iter().map(|swatch| u64::from(swatch.count())).sum();

        Self {
            swatches,
            total_pixels,
        }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Total number of pixels the tally covers, equal to the number of
    /// non-transparent pixels in the quantized input.
    pub fn total_pixels(&self) -> u64 {
        self.total_pixels
    }

    /// The pixel count for a color given as a lowercase `#rrggbb` string.
    pub fn count(&self, hex: &str) -> Option<u32> {
        self.swatches
            .iter()
            .find(|swatch| swatch.hex() == hex)
            .map(|swatch| swatch.count())
    }

    /// The tally as a mapping from `#rrggbb` color to pixel count.
    pub fn to_map(&self) -> HashMap<String, u32> {
        self.swatches
            .iter()
            .map(|swatch| (swatch.hex(), swatch.count()))
            .collect()
    }

    /// The palette entries in the given order.
    pub fn sorted(&self, order: SortOrder) -> Vec<Swatch> {
        let mut swatches = self.swatches.clone();
        sort::sort_swatches(&mut swatches, order);

        swatches
    }

    pub fn most_common(&self) -> Option<&Swatch> {
        self.swatches.iter().max_by_key(|swatch| swatch.count())
    }
}

impl ColorCountsBuilder {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            max_colors: DEFAULT_MAX_COLORS,
            resize_area: 0,
        }
    }

    pub fn max_colors(self, max_colors: usize) -> Self {
        Self { max_colors, ..self }
    }

    /// Downscale the image to roughly `resize_area` pixels before quantizing.
    ///
    /// Disabled by default (`0`), in which case the tally covers every source
    /// pixel exactly. Opting in trades exact counts for speed on large images;
    /// the downscale is nearest-neighbor, so no colors absent from the source
    /// are invented.
    pub fn resize_image_area(self, resize_area: u32) -> Self {
        Self { resize_area, ..self }
    }

    pub fn generate(mut self) -> Result<ColorCounts, Error> {
        self.scale_image_down();

        quantize(self.image.as_raw(), self.max_colors)
    }

    fn scale_image_down(&mut self) {
        let (width, height) = self.image.dimensions();
        let area = width * height;

        if self.resize_area == 0 || area <= self.resize_area {
            return;
        }

        let scale_ratio = (self.resize_area as f32 / area as f32).sqrt();

        self.image = image::imageops::resize(
            &self.image,
            (width as f32 * scale_ratio).ceil() as u32,
            (height as f32 * scale_ratio).ceil() as u32,
            image::imageops::FilterType::Nearest,
        );
    }
}

fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let raw = palette::Srgb::from_components(rgb);
    let raw_float: palette::Srgb<f32> = raw.into_format();
    let hsl: palette::Hsl = raw_float.into_color();
    let (h, s, l) = hsl.into_components();

    (h.to_positive_degrees(), s, l)
}

fn relative_luminance(rgb: (u8, u8, u8)) -> f32 {
    let raw = palette::Srgb::from_components(rgb);
    let linear = raw.into_format::<f32>().into_linear();

    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn builder_tallies_the_whole_image() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([12, 34, 56, 255]));

        let counts = ColorCounts::from_image(image).max_colors(4).generate().unwrap();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.count("#0c2238"), Some(16));
        assert_eq!(counts.total_pixels(), 16);
    }

    #[test]
    fn builder_downscale_reduces_the_tally_base() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255]));

        let counts = ColorCounts::from_image(image)
            .resize_image_area(25)
            .generate()
            .unwrap();

        // 100x100 scaled to a quarter of the linear size
        assert_eq!(counts.total_pixels(), 25);
        assert_eq!(counts.count("#ff0000"), Some(25));
    }

    #[test]
    fn most_common_picks_the_largest_entry() {
        let mut image = RgbaImage::from_pixel(5, 1, Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let counts = ColorCounts::from_image(image).max_colors(2).generate().unwrap();

        assert_eq!(counts.count("#0000ff"), Some(2));
        assert_eq!(counts.most_common().unwrap().hex(), "#ff0000");
        assert_eq!(counts.most_common().unwrap().count(), 3);
    }

    #[test]
    fn zero_max_colors_is_rejected_by_the_builder_too() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));

        let result = ColorCounts::from_image(image).max_colors(0).generate();

        assert_eq!(result, Err(Error::InvalidMaxColors(0)));
    }

    #[test]
    fn hue_of_gray_is_zero() {
        let (h, s, _) = rgb_to_hsl((128, 128, 128));

        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
    }
}
