//! Two-level dithering of grayscale images.
//!
//! Error-diffusion algorithms scan row-major, threshold each pixel at 127 and
//! push the quantization error onto unvisited neighbors through a fixed
//! kernel. Writes that fall outside the image are dropped. Ordered
//! algorithms compare each pixel against a tiled Bayer matrix instead.

use crate::pixel::PixelSource;
use crate::sampler::ScalarGrid;
use image::{GrayImage, Luma};
use std::fmt;

/// Dithering algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DitherAlgorithm {
    /// Passthrough, no quantization
    #[default]
    None,
    FloydSteinberg,
    Bayer2x2,
    Bayer4x4,
    Bayer8x8,
    Atkinson,
    Sierra,
    SierraLite,
    Stucki,
    Burkes,
    JarvisJudiceNinke,
}

impl DitherAlgorithm {
    /// Every algorithm, in listing order.
    pub const ALL: [DitherAlgorithm; 11] = [
        DitherAlgorithm::None,
        DitherAlgorithm::FloydSteinberg,
        DitherAlgorithm::Bayer2x2,
        DitherAlgorithm::Bayer4x4,
        DitherAlgorithm::Bayer8x8,
        DitherAlgorithm::Atkinson,
        DitherAlgorithm::Sierra,
        DitherAlgorithm::SierraLite,
        DitherAlgorithm::Stucki,
        DitherAlgorithm::Burkes,
        DitherAlgorithm::JarvisJudiceNinke,
    ];

    /// Parse a name or alias. Unknown names select [`DitherAlgorithm::None`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "floyd-steinberg" | "fs" => DitherAlgorithm::FloydSteinberg,
            "bayer2x2" | "bayer2" => DitherAlgorithm::Bayer2x2,
            "bayer4x4" | "bayer4" | "bayer" => DitherAlgorithm::Bayer4x4,
            "bayer8x8" | "bayer8" => DitherAlgorithm::Bayer8x8,
            "atkinson" => DitherAlgorithm::Atkinson,
            "sierra" => DitherAlgorithm::Sierra,
            "sierra-lite" | "sierra2" => DitherAlgorithm::SierraLite,
            "stucki" => DitherAlgorithm::Stucki,
            "burkes" => DitherAlgorithm::Burkes,
            "jarvis" | "jjn" => DitherAlgorithm::JarvisJudiceNinke,
            _ => DitherAlgorithm::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DitherAlgorithm::None => "none",
            DitherAlgorithm::FloydSteinberg => "floyd-steinberg",
            DitherAlgorithm::Bayer2x2 => "bayer2x2",
            DitherAlgorithm::Bayer4x4 => "bayer4x4",
            DitherAlgorithm::Bayer8x8 => "bayer8x8",
            DitherAlgorithm::Atkinson => "atkinson",
            DitherAlgorithm::Sierra => "sierra",
            DitherAlgorithm::SierraLite => "sierra-lite",
            DitherAlgorithm::Stucki => "stucki",
            DitherAlgorithm::Burkes => "burkes",
            DitherAlgorithm::JarvisJudiceNinke => "jarvis",
        }
    }

    fn method(self) -> Method {
        match self {
            DitherAlgorithm::None => Method::Passthrough,
            DitherAlgorithm::FloydSteinberg => Method::Diffuse(&FLOYD_STEINBERG),
            DitherAlgorithm::Bayer2x2 => Method::Ordered(2, &BAYER_2X2),
            DitherAlgorithm::Bayer4x4 => Method::Ordered(4, &BAYER_4X4),
            DitherAlgorithm::Bayer8x8 => Method::Ordered(8, &BAYER_8X8),
            DitherAlgorithm::Atkinson => Method::Diffuse(&ATKINSON),
            DitherAlgorithm::Sierra => Method::Diffuse(&SIERRA),
            DitherAlgorithm::SierraLite => Method::Diffuse(&SIERRA_LITE),
            DitherAlgorithm::Stucki => Method::Diffuse(&STUCKI),
            DitherAlgorithm::Burkes => Method::Diffuse(&BURKES),
            DitherAlgorithm::JarvisJudiceNinke => Method::Diffuse(&JARVIS_JUDICE_NINKE),
        }
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error-propagation kernel: `(dx, dy, weight)` taps, each scaled by
/// `1 / divisor`.
struct Kernel {
    divisor: f64,
    taps: &'static [(isize, usize, f64)],
}

enum Method {
    Passthrough,
    Diffuse(&'static Kernel),
    /// Matrix side and row-major levels `0..side*side`.
    Ordered(usize, &'static [u8]),
}

#[rustfmt::skip]
static FLOYD_STEINBERG: Kernel = Kernel {
    divisor: 16.0,
    taps: &[(1, 0, 7.0), (-1, 1, 3.0), (0, 1, 5.0), (1, 1, 1.0)],
};

// Only 6/8 of the error is propagated.
#[rustfmt::skip]
static ATKINSON: Kernel = Kernel {
    divisor: 8.0,
    taps: &[(1, 0, 1.0), (2, 0, 1.0), (-1, 1, 1.0), (0, 1, 1.0), (1, 1, 1.0), (0, 2, 1.0)],
};

#[rustfmt::skip]
static SIERRA: Kernel = Kernel {
    divisor: 32.0,
    taps: &[
        (1, 0, 5.0), (2, 0, 3.0),
        (-2, 1, 2.0), (-1, 1, 4.0), (0, 1, 5.0), (1, 1, 4.0), (2, 1, 2.0),
        (-1, 2, 2.0), (0, 2, 3.0), (1, 2, 2.0),
    ],
};

#[rustfmt::skip]
static SIERRA_LITE: Kernel = Kernel {
    divisor: 4.0,
    taps: &[(1, 0, 2.0), (-1, 1, 1.0), (0, 1, 1.0)],
};

#[rustfmt::skip]
static STUCKI: Kernel = Kernel {
    divisor: 42.0,
    taps: &[
        (1, 0, 8.0), (2, 0, 4.0),
        (-2, 1, 2.0), (-1, 1, 4.0), (0, 1, 8.0), (1, 1, 4.0), (2, 1, 2.0),
        (-2, 2, 1.0), (-1, 2, 2.0), (0, 2, 4.0), (1, 2, 2.0), (2, 2, 1.0),
    ],
};

#[rustfmt::skip]
static BURKES: Kernel = Kernel {
    divisor: 32.0,
    taps: &[
        (1, 0, 8.0), (2, 0, 4.0),
        (-2, 1, 2.0), (-1, 1, 4.0), (0, 1, 8.0), (1, 1, 4.0), (2, 1, 2.0),
    ],
};

#[rustfmt::skip]
static JARVIS_JUDICE_NINKE: Kernel = Kernel {
    divisor: 48.0,
    taps: &[
        (1, 0, 7.0), (2, 0, 5.0),
        (-2, 1, 3.0), (-1, 1, 5.0), (0, 1, 7.0), (1, 1, 5.0), (2, 1, 3.0),
        (-2, 2, 1.0), (-1, 2, 3.0), (0, 2, 5.0), (1, 2, 3.0), (2, 2, 1.0),
    ],
};

static BAYER_2X2: [u8; 4] = [0, 2, 3, 1];

#[rustfmt::skip]
static BAYER_4X4: [u8; 16] = [
     0,  8,  2, 10,
    12,  4, 14,  6,
     3, 11,  1,  9,
    15,  7, 13,  5,
];

#[rustfmt::skip]
static BAYER_8X8: [u8; 64] = [
     0, 32,  8, 40,  2, 34, 10, 42,
    48, 16, 56, 24, 50, 18, 58, 26,
    12, 44,  4, 36, 14, 46,  6, 38,
    60, 28, 52, 20, 62, 30, 54, 22,
     3, 35, 11, 43,  1, 33,  9, 41,
    51, 19, 59, 27, 49, 17, 57, 25,
    15, 47,  7, 39, 13, 45,  5, 37,
    63, 31, 55, 23, 61, 29, 53, 21,
];

/// Quantization threshold for error diffusion.
const THRESHOLD: f64 = 127.0;

/// Run `method` over `values` (0..=255 scale, row-major), writing 0 or 255
/// per pixel through `out`.
fn quantize_levels(
    values: &[f64],
    width: usize,
    height: usize,
    method: &Method,
    mut out: impl FnMut(usize, u8),
) {
    match method {
        Method::Passthrough => {}
        Method::Diffuse(kernel) => {
            let mut errors = values.to_vec();
            for y in 0..height {
                for x in 0..width {
                    let i = y * width + x;
                    let old = errors[i];
                    let new = if old > THRESHOLD { 255.0 } else { 0.0 };
                    out(i, new as u8);

                    let err = (old - new) / kernel.divisor;
                    for &(dx, dy, weight) in kernel.taps {
                        let nx = x as isize + dx;
                        let ny = y + dy;
                        if nx < 0 || nx as usize >= width || ny >= height {
                            continue;
                        }
                        errors[ny * width + nx as usize] += err * weight;
                    }
                }
            }
        }
        Method::Ordered(side, matrix) => {
            let side = *side;
            let levels = (side * side) as f64;
            for y in 0..height {
                for x in 0..width {
                    let i = y * width + x;
                    let threshold = matrix[(y % side) * side + x % side] as f64 / levels;
                    out(i, if values[i] / 255.0 > threshold { 255 } else { 0 });
                }
            }
        }
    }
}

/// Dither a grayscale image. Every output pixel is 0 or 255, except for
/// [`DitherAlgorithm::None`], which returns the input unchanged.
pub fn dither(gray: &GrayImage, algorithm: DitherAlgorithm) -> GrayImage {
    let method = algorithm.method();
    if let Method::Passthrough = method {
        return gray.clone();
    }

    let (width, height) = gray.dimensions();
    let values: Vec<f64> = gray.as_raw().iter().map(|&v| v as f64).collect();
    let mut result = vec![0u8; values.len()];
    quantize_levels(
        &values,
        width as usize,
        height as usize,
        &method,
        |i, v| result[i] = v,
    );
    GrayImage::from_raw(width, height, result).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Dither a brightness grid (`[0, 1]` per cell). Output cells are 0.0 or 1.0.
pub fn dither_grid(grid: &ScalarGrid, algorithm: DitherAlgorithm) -> ScalarGrid {
    let method = algorithm.method();
    if let Method::Passthrough = method {
        return grid.clone();
    }

    let (width, height) = (grid.width(), grid.height());
    let values: Vec<f64> = grid.values().iter().map(|&b| b * 255.0).collect();
    let mut result = ScalarGrid::new(width, height);
    quantize_levels(&values, width, height, &method, |i, v| {
        result.set(i % width, i / width, v as f64 / 255.0)
    });
    result
}

/// Convert a source to 8-bit grayscale with integer BT.601 weights.
pub fn to_gray<S: PixelSource + ?Sized>(src: &S) -> GrayImage {
    let b = src.bounds();
    GrayImage::from_fn(b.width(), b.height(), |x, y| {
        let c = src.color_at(x + b.min_x, y + b.min_y);
        let (r, g, b) = (c[0] as u32, c[1] as u32, c[2] as u32);
        Luma([((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16) as u8])
    })
}

/// Grayscale-convert and dither a source in one go.
pub fn dither_source<S: PixelSource + ?Sized>(src: &S, algorithm: DitherAlgorithm) -> GrayImage {
    dither(&to_gray(src), algorithm)
}

/// Reduce a grayscale image to `levels` evenly spaced values (clamped to
/// `2..=256`).
pub fn posterize(gray: &GrayImage, levels: usize) -> GrayImage {
    let levels = levels.clamp(2, 256);
    let step = 256.0 / levels as f64;
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        let level = ((p[0] as f64 / step) as usize).min(levels - 1);
        p[0] = (level as f64 * step) as u8;
    }
    out
}

/// Linearly stretch the value range of `gray` onto `lo..=hi`. A uniform
/// image maps to the midpoint.
pub fn contrast_stretch(gray: &GrayImage, lo: u8, hi: u8) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    let mut out = gray.clone();
    if min >= max {
        let mid = ((lo as u16 + hi as u16) / 2) as u8;
        for p in out.pixels_mut() {
            p[0] = mid;
        }
        return out;
    }

    let scale = (hi as f64 - lo as f64) / (max - min) as f64;
    for p in out.pixels_mut() {
        p[0] = (lo as f64 + (p[0] - min) as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }
    out
}
