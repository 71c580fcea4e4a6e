//! Frequency-bucket palette reduction.
//!
//! Colors are bucketed by their top five bits per channel over every other
//! row and column, and the most populated buckets become the palette. This
//! is not median cut; Sixel output depends on these exact buckets.

use crate::pixel::PixelSource;
use image::Rgb;
use std::collections::HashMap;

/// Largest palette a Sixel image can address.
pub const MAX_COLORS: usize = 256;

/// An ordered list of at most [`MAX_COLORS`] colors. Index 0 is not special.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the closest color by squared RGB distance. Ties go to the
    /// lowest index.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> usize {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let dr = r as i32 - c[0] as i32;
            let dg = g as i32 - c[1] as i32;
            let db = b as i32 - c[2] as i32;
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }
}

/// 15-bit bucket key: five bits per channel.
#[inline]
fn bucket(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 10) | ((g as u16 >> 3) << 5) | (b as u16 >> 3)
}

#[inline]
fn expand(key: u16) -> Rgb<u8> {
    Rgb([
        (((key >> 10) & 0x1f) << 3) as u8,
        (((key >> 5) & 0x1f) << 3) as u8,
        ((key & 0x1f) << 3) as u8,
    ])
}

/// Build a palette of at most `max_colors` entries (capped at
/// [`MAX_COLORS`]) from the most frequent buckets of `src`.
///
/// Buckets with equal counts are ordered by key so the result is
/// deterministic. A source that yields no samples gets `{black, white}`.
pub fn quantize<S: PixelSource + ?Sized>(src: &S, max_colors: usize) -> Palette {
    let bounds = src.bounds();
    let mut counts: HashMap<u16, u32> = HashMap::new();
    for y in (bounds.min_y..bounds.max_y).step_by(2) {
        for x in (bounds.min_x..bounds.max_x).step_by(2) {
            let c = src.color_at(x, y);
            *counts.entry(bucket(c[0], c[1], c[2])).or_insert(0) += 1;
        }
    }

    if counts.is_empty() {
        return Palette {
            colors: vec![Rgb([0, 0, 0]), Rgb([255, 255, 255])],
        };
    }

    let mut sorted: Vec<(u16, u32)> = counts.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let colors = sorted
        .into_iter()
        .take(max_colors.min(MAX_COLORS))
        .map(|(key, _)| expand(key))
        .collect();
    Palette { colors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bucket_keys() {
        assert_eq!(bucket(0, 0, 0), 0);
        assert_eq!(bucket(255, 255, 255), 0x7fff);
        assert_eq!(bucket(255, 0, 0), 31 << 10);
        assert_eq!(expand(bucket(255, 128, 7)), Rgb([248, 128, 0]));
    }

    #[test]
    fn test_solid_image_single_entry() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]));
        let palette = quantize(&img, 256);
        assert_eq!(palette.colors(), &[Rgb([248, 0, 0])]);
    }

    #[test]
    fn test_most_frequent_first() {
        // 3/4 of the sampled pixels are blue
        let img = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 2 {
                Rgba([255, 255, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let palette = quantize(&img, 256);
        assert_eq!(palette.colors(), &[Rgb([0, 0, 248]), Rgb([248, 248, 0])]);
        assert_eq!(quantize(&img, 1).len(), 1);
    }

    #[test]
    fn test_stride_skips_odd_pixels() {
        // a color only at odd coordinates is never sampled
        let img = RgbaImage::from_fn(4, 4, |x, y| {
            if x % 2 == 1 && y % 2 == 1 {
                Rgba([0, 255, 0, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        assert_eq!(quantize(&img, 256).colors(), &[Rgb([0, 0, 0])]);
    }

    #[test]
    fn test_ties_are_ordered_by_key() {
        let img = RgbaImage::from_fn(4, 1, |x, _| {
            if x == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        // samples x = 0 (white) and x = 2 (black), one each
        assert_eq!(
            quantize(&img, 256).colors(),
            &[Rgb([0, 0, 0]), Rgb([248, 248, 248])]
        );
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let palette = Palette {
            colors: vec![Rgb([0, 0, 0]), Rgb([20, 0, 0]), Rgb([20, 0, 0])],
        };
        assert_eq!(palette.nearest(10, 0, 0), 0);
        assert_eq!(palette.nearest(19, 0, 0), 1);
        assert_eq!(palette.nearest(255, 255, 255), 1);
    }

    #[test]
    fn test_palette_never_exceeds_limit() {
        let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, 0, 255]));
        assert_eq!(quantize(&img, 10_000).len(), MAX_COLORS);
    }
}
