//! Turn a [`ColorCounts`] tally into exportable values: CSV text, JSON-ready
//! records, or a palette grid image. Writing the results anywhere is the
//! caller's business.

use crate::{ColorCounts, SortOrder};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Edge length in pixels of one grid cell in [`palette_image`].
pub const DEFAULT_SWATCH_SIZE: u32 = 64;

/// A full palette report ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteExport {
    pub total_pixels: u64,
    pub total_colors: usize,
    pub colors: Vec<ColorRecord>,
}

/// One palette color in a [`PaletteExport`], carrying the color in hex, RGB
/// and HSL plus its pixel count and two-decimal share of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRecord {
    pub name: String,
    pub hex: String,
    pub rgb: RgbRecord,
    pub hsl: HslRecord,
    pub pixel_count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbRecord {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslRecord {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Build the export records for a tally, named `Color1..ColorN` in the
/// requested order.
pub fn records(counts: &ColorCounts, order: SortOrder) -> PaletteExport {
    let total = counts.total_pixels();

    let colors = counts
        .sorted(order)
        .iter()
        .enumerate()
        .map(|(i, swatch)| {
            let (r, g, b) = swatch.rgb();
            let (h, s, l) = swatch.hsl();

            ColorRecord {
                name: format!("Color{}", i + 1),
                hex: swatch.hex(),
                rgb: RgbRecord { r, g, b },
                hsl: HslRecord { h, s, l },
                pixel_count: swatch.count(),
                percentage: percentage_of(swatch.count(), total),
            }
        })
        .collect();

    PaletteExport {
        total_pixels: total,
        total_colors: counts.len(),
        colors,
    }
}

/// Serialize the tally to pretty-printed JSON.
pub fn to_json(counts: &ColorCounts, order: SortOrder) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&records(counts, order))
}

/// Render the tally as CSV with the columns
/// `Color,Hex,R,G,B,Pixel Count,Percentage`.
pub fn to_csv(counts: &ColorCounts, order: SortOrder) -> String {
    let total = counts.total_pixels();
    let mut csv = String::from("Color,Hex,R,G,B,Pixel Count,Percentage\n");

    for (i, swatch) in counts.sorted(order).iter().enumerate() {
        let (r, g, b) = swatch.rgb();

        csv.push_str(&format!(
            "Color{},{},{},{},{},{},{:.2}%\n",
            i + 1,
            swatch.hex(),
            r,
            g,
            b,
            swatch.count(),
            swatch.count() as f64 * 100.0 / total as f64,
        ));
    }

    csv
}

/// Render the tally as a grid image with one `swatch_size` square per palette
/// color and `ceil(sqrt(n))` columns. Trailing cells past the last color stay
/// transparent, and an empty tally yields a zero-sized image.
pub fn palette_image(counts: &ColorCounts, order: SortOrder, swatch_size: u32) -> RgbaImage {
    let colors = counts.sorted(order);
    let columns = (colors.len() as f64).sqrt().ceil() as u32;
    let rows = if columns > 0 {
        (colors.len() as u32 + columns - 1) / columns
    } else {
        0
    };

    RgbaImage::from_fn(columns * swatch_size, rows * swatch_size, |x, y| {
        let cell = (y / swatch_size) * columns + x / swatch_size;

        match colors.get(cell as usize) {
            Some(swatch) => {
                let (r, g, b) = swatch.rgb();
                Rgba([r, g, b, 255])
            }
            None => Rgba([0, 0, 0, 0]),
        }
    })
}

fn percentage_of(count: u32, total: u64) -> f64 {
    let percentage = count as f64 * 100.0 / total as f64;

    // two decimals, matching the CSV rendering
    (percentage * 100.0).round() / 100.0
}
