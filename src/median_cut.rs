use crate::{error::Error, swatch::Swatch, ColorCounts};
use std::collections::HashMap;

const SAMPLE_CHANNELS: usize = 4;

/// Reduce a flat RGBA sample buffer to at most `max_colors` representative
/// colors, tallying how many source pixels each color stands for.
///
/// Pixels whose alpha is zero are excluded entirely: they are neither counted
/// nor allowed to pull on any average. An empty or fully transparent buffer
/// yields an empty tally.
///
/// # Errors
///
/// Returns [`Error::InvalidMaxColors`] if `max_colors` is zero and
/// [`Error::TruncatedPixelBuffer`] if the buffer does not hold a whole number
/// of RGBA samples.
pub fn quantize(samples: &[u8], max_colors: usize) -> Result<ColorCounts, Error> {
    if max_colors < 1 {
        return Err(Error::InvalidMaxColors(max_colors));
    }

    if samples.len() % SAMPLE_CHANNELS != 0 {
        return Err(Error::TruncatedPixelBuffer(samples.len()));
    }

    let pixels = samples
        .chunks_exact(SAMPLE_CHANNELS)
        .filter(|sample| sample[3] != 0)
        .map(|sample| Rgb {
            red: sample[0],
            green: sample[1],
            blue: sample[2],
        })
        .collect::<Vec<_>>();

    if pixels.is_empty() {
        return Ok(ColorCounts::from_swatches(Vec::new()));
    }

    let mut buckets = vec![Bucket::new(pixels)];

    while buckets.len() < max_colors {
        // scan for the bucket with the strictly widest channel range; on ties the
        // earliest bucket in the collection wins so the split order is stable
        let (index, widest) = buckets
            .iter()
            .enumerate()
            .fold((0, 0), |(widest_index, widest), (i, bucket)| {
                let range = bucket.widest_range();

                if range > widest {
                    (i, range)
                } else {
                    (widest_index, widest)
                }
            });

        if widest == 0 {
            // every remaining bucket is a single uniform color; further splits
            // cannot reduce variance
            break;
        }

        // replace the bucket in place with its two halves, keeping the
        // collection order otherwise untouched
        let (lower, upper) = buckets.remove(index).split();
        buckets.insert(index, upper);
        buckets.insert(index, lower);
    }

    // collapse each bucket to its average color. Buckets whose averages round
    // to the same color merge into one entry with their counts summed, and
    // first-bucket order is kept so the output is reproducible
    let mut merged: HashMap<(u8, u8, u8), usize> = HashMap::new();
    let mut swatches: Vec<Swatch> = Vec::with_capacity(buckets.len());

    for bucket in &buckets {
        let rgb = bucket.average_color();
        let count = bucket.pixels.len() as u32;

        match merged.get(&rgb) {
            Some(&existing) => swatches[existing].absorb(count),
            None => {
                merged.insert(rgb, swatches.len());
                swatches.push(Swatch::new(rgb, count));
            }
        }
    }

    Ok(ColorCounts::from_swatches(swatches))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    fn channel(self, component: Component) -> u8 {
        match component {
            Component::Red => self.red,
            Component::Green => self.green,
            Component::Blue => self.blue,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Component {
    Red,
    Green,
    Blue,
}

/// A group of pixels plus its cached bounds. The bounds always equal the
/// componentwise min/max of the pixels the bucket currently holds, and a
/// bucket is never empty.
struct Bucket {
    pixels: Vec<Rgb>,
    red_range: (u8, u8),
    green_range: (u8, u8),
    blue_range: (u8, u8),
}

impl Bucket {
    fn new(pixels: Vec<Rgb>) -> Self {
        // compute the bounds to tightly fit around the pixels within

        // min, max
        let (mut min_red, mut max_red) = (u8::MAX, 0);
        let (mut min_green, mut max_green) = (u8::MAX, 0);
        let (mut min_blue, mut max_blue) = (u8::MAX, 0);

        for pixel in &pixels {
            if pixel.red < min_red {
                min_red = pixel.red;
            }

            if pixel.red > max_red {
                max_red = pixel.red;
            }

            if pixel.green < min_green {
                min_green = pixel.green;
            }

            if pixel.green > max_green {
                max_green = pixel.green;
            }

            if pixel.blue < min_blue {
                min_blue = pixel.blue;
            }

            if pixel.blue > max_blue {
                max_blue = pixel.blue;
            }
        }

        Self {
            pixels,
            red_range: (min_red, max_red),
            green_range: (min_green, max_green),
            blue_range: (min_blue, max_blue),
        }
    }

    /// The largest of the three channel ranges. Zero means every pixel in the
    /// bucket is the same color.
    fn widest_range(&self) -> u8 {
        let red = self.red_range.1 - self.red_range.0;
        let green = self.green_range.1 - self.green_range.0;
        let blue = self.blue_range.1 - self.blue_range.0;

        red.max(green).max(blue)
    }

    fn widest_component(&self) -> Component {
        let red = self.red_range.1 - self.red_range.0;
        let green = self.green_range.1 - self.green_range.0;
        let blue = self.blue_range.1 - self.blue_range.0;

        // fixed priority for ties: red over green over blue
        if red >= green && red >= blue {
            Component::Red
        } else if green >= blue {
            Component::Green
        } else {
            Component::Blue
        }
    }

    /// Split the bucket at the median of its widest channel. A bucket with a
    /// non-zero range holds at least two pixels, so neither half is empty.
    fn split(mut self) -> (Bucket, Bucket) {
        assert!(self.pixels.len() > 1);

        let component = self.widest_component();

        // the sort is stable: pixels with equal channel values keep their input
        // order, which keeps the whole algorithm deterministic
        self.pixels.sort_by_key(|pixel| pixel.channel(component));

        let upper = self.pixels.split_off(self.pixels.len() / 2);

        (Bucket::new(self.pixels), Bucket::new(upper))
    }

    /// The componentwise mean of the bucket's pixels, rounded half up.
    fn average_color(&self) -> (u8, u8, u8) {
        let (red_sum, green_sum, blue_sum) =
            self.pixels
                .iter()
                .fold((0u64, 0u64, 0u64), |(red_sum, green_sum, blue_sum), pixel| {
                    (
                        red_sum + pixel.red as u64,
                        green_sum + pixel.green as u64,
                        blue_sum + pixel.blue as u64,
                    )
                });

        let count = self.pixels.len() as f64;

        (
            (red_sum as f64 / count).round() as u8,
            (green_sum as f64 / count).round() as u8,
            (blue_sum as f64 / count).round() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(pixels: &[(u8, u8, u8, u8)]) -> Vec<u8> {
        pixels.iter().flat_map(|&(r, g, b, a)| [r, g, b, a]).collect()
    }

    /// Deterministic pseudo-random sample buffer, always the same for a given
    /// seed and length.
    fn scrambled_rgba(seed: u64, pixels: usize) -> Vec<u8> {
        let mut state = seed;
        let mut data = Vec::with_capacity(pixels * 4);

        for _ in 0..pixels * 4 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            data.push((state >> 56) as u8);
        }

        data
    }

    #[test]
    fn black_and_white_split_in_two() {
        let data = rgba(&[
            (0, 0, 0, 255),
            (0, 0, 0, 255),
            (255, 255, 255, 255),
            (255, 255, 255, 255),
        ]);

        let counts = quantize(&data, 2).unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.count("#000000"), Some(2));
        assert_eq!(counts.count("#ffffff"), Some(2));
    }

    #[test]
    fn single_bucket_averages_all_pixels() {
        let data = rgba(&[(10, 20, 30, 255), (20, 20, 20, 255), (30, 20, 10, 255)]);

        let counts = quantize(&data, 1).unwrap();

        assert_eq!(
            counts.to_map(),
            HashMap::from([("#141414".to_string(), 3)])
        );
    }

    #[test]
    fn count_conservation() {
        let data = scrambled_rgba(42, 1000);
        let opaque = data.chunks_exact(4).filter(|sample| sample[3] != 0).count() as u64;

        for max_colors in [1, 2, 7, 16, 100] {
            let counts = quantize(&data, max_colors).unwrap();
            assert_eq!(counts.total_pixels(), opaque);
            assert_eq!(
                counts.swatches().iter().map(|s| u64::from(s.count())).sum::<u64>(),
                opaque
            );
        }
    }

    #[test]
    fn palette_bound_respected() {
        let data = scrambled_rgba(7, 500);

        for max_colors in [1, 3, 8, 64, 1000] {
            let counts = quantize(&data, max_colors).unwrap();
            assert!(counts.len() <= max_colors);
            assert!(!counts.is_empty());
        }
    }

    #[test]
    fn identical_input_identical_output() {
        let data = scrambled_rgba(1234, 800);

        let first = quantize(&data, 12).unwrap();
        let second = quantize(&data, 12).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_map(), second.to_map());
    }

    #[test]
    fn uniform_image_yields_one_entry() {
        let data = rgba(&[(90, 120, 150, 255); 8]);

        for max_colors in [1, 2, 5, 16] {
            let counts = quantize(&data, max_colors).unwrap();
            assert_eq!(counts.to_map(), HashMap::from([("#5a7896".to_string(), 8)]));
        }
    }

    #[test]
    fn max_colors_one_is_the_global_average() {
        let data = scrambled_rgba(99, 300);
        let opaque = data.chunks_exact(4).filter(|sample| sample[3] != 0).count() as u32;

        let counts = quantize(&data, 1).unwrap();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.swatches()[0].count(), opaque);
    }

    #[test]
    fn fully_transparent_input_is_empty() {
        let data = rgba(&[(10, 20, 30, 0), (200, 100, 50, 0), (0, 0, 0, 0)]);

        let counts = quantize(&data, 8).unwrap();

        assert!(counts.is_empty());
        assert_eq!(counts.total_pixels(), 0);
    }

    #[test]
    fn empty_input_is_empty() {
        let counts = quantize(&[], 4).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn transparent_pixels_are_skipped_but_faint_ones_count() {
        let data = rgba(&[(255, 0, 0, 0), (0, 255, 0, 1), (0, 0, 255, 255)]);

        let counts = quantize(&data, 4).unwrap();

        assert_eq!(counts.total_pixels(), 2);
        assert_eq!(counts.count("#00ff00"), Some(1));
        assert_eq!(counts.count("#0000ff"), Some(1));
        assert_eq!(counts.count("#ff0000"), None);
    }

    #[test]
    fn splitting_saturates_on_few_distinct_colors() {
        // two distinct colors can never produce more than two entries no matter
        // how large the requested palette is
        let data = rgba(&[
            (10, 10, 10, 255),
            (200, 200, 200, 255),
            (10, 10, 10, 255),
            (200, 200, 200, 255),
            (10, 10, 10, 255),
        ]);

        let counts = quantize(&data, 64).unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.count("#0a0a0a"), Some(3));
        assert_eq!(counts.count("#c8c8c8"), Some(2));
    }

    #[test]
    fn averages_round_half_up() {
        // means of 10.5 per channel round to 11
        let data = rgba(&[(10, 10, 10, 255), (11, 11, 11, 255)]);

        let counts = quantize(&data, 1).unwrap();

        assert_eq!(counts.to_map(), HashMap::from([("#0b0b0b".to_string(), 2)]));
    }

    #[test]
    fn colliding_averages_merge_into_one_entry() {
        // splits into [0, 1] and [1, 1] on red; both average to red 1 after
        // rounding, so the entries merge with their counts summed
        let data = rgba(&[
            (0, 0, 0, 255),
            (1, 0, 0, 255),
            (1, 0, 0, 255),
            (1, 0, 0, 255),
        ]);

        let counts = quantize(&data, 2).unwrap();

        assert_eq!(counts.to_map(), HashMap::from([("#010000".to_string(), 4)]));
    }

    #[test]
    fn zero_max_colors_is_rejected() {
        let data = rgba(&[(1, 2, 3, 255)]);
        assert_eq!(quantize(&data, 0), Err(Error::InvalidMaxColors(0)));
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        assert_eq!(quantize(&[1, 2, 3], 4), Err(Error::TruncatedPixelBuffer(3)));
        assert_eq!(quantize(&[0; 7], 4), Err(Error::TruncatedPixelBuffer(7)));
    }

    #[test]
    fn red_takes_priority_on_equal_ranges() {
        // red and green ranges are both 255; the split must happen on red, so
        // the two reds land in the upper bucket together
        let data = rgba(&[
            (255, 0, 0, 255),
            (0, 255, 0, 255),
            (255, 0, 0, 255),
            (0, 255, 0, 255),
        ]);

        let counts = quantize(&data, 2).unwrap();

        assert_eq!(counts.count("#00ff00"), Some(2));
        assert_eq!(counts.count("#ff0000"), Some(2));
    }
}
