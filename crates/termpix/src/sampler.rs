//! Maps a character grid onto source pixels.
//!
//! Each target cell covers a `step_x x step_y` rectangle of the source whose
//! top-left corner is `(floor(x * step_x), floor(y * step_y))`. The cell value
//! is the unweighted mean of every in-bounds pixel of that rectangle.

use crate::pixel::{Bounds, PixelSource};

/// BT.601 luma of 8-bit channel values, normalized to `[0, 1]`.
#[inline]
pub fn luma(r: f64, g: f64, b: f64) -> f64 {
    (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
}

/// Averaged color and brightness of one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub brightness: f64,
}

/// Row-major grid of scalars at target resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ScalarGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f64) {
        self.values[y * self.width + x] = v;
    }

    pub fn row(&self, y: usize) -> &[f64] {
        &self.values[y * self.width..(y + 1) * self.width]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Source-to-grid mapping for one conversion.
#[derive(Clone, Copy, Debug)]
pub struct Sampler {
    bounds: Bounds,
    width: usize,
    height: usize,
    step_x: f64,
    step_y: f64,
}

impl Sampler {
    /// `width` and `height` must be non-zero and `bounds` non-empty.
    pub fn new(bounds: Bounds, width: usize, height: usize) -> Self {
        Self {
            bounds,
            width,
            height,
            step_x: bounds.width() as f64 / width as f64,
            step_y: bounds.height() as f64 / height as f64,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Absolute source coordinate of the cell's top-left pixel.
    #[inline]
    fn origin(&self, x: usize, y: usize) -> (u32, u32) {
        let sx = ((x as f64 * self.step_x) as u32 + self.bounds.min_x).min(self.bounds.max_x - 1);
        let sy = ((y as f64 * self.step_y) as u32 + self.bounds.min_y).min(self.bounds.max_y - 1);
        (sx, sy)
    }

    /// Sample cell `(x, y)`.
    pub fn cell<S: PixelSource + ?Sized>(&self, src: &S, x: usize, y: usize) -> Cell {
        let (sx, sy) = self.origin(x, y);
        // steps below one pixel collapse to a single sample
        let w = (self.step_x as u32).max(1);
        let h = (self.step_y as u32).max(1);

        let mut total = [0.0f64; 3];
        let mut count = 0u32;
        for py in sy..sy.saturating_add(h).min(self.bounds.max_y) {
            for px in sx..sx.saturating_add(w).min(self.bounds.max_x) {
                let c = src.color_at(px, py);
                total[0] += c[0] as f64;
                total[1] += c[1] as f64;
                total[2] += c[2] as f64;
                count += 1;
            }
        }
        if count == 0 {
            return Cell::default();
        }

        let n = count as f64;
        let (r, g, b) = (total[0] / n, total[1] / n, total[2] / n);
        Cell {
            r: r as u8,
            g: g as u8,
            b: b as u8,
            brightness: luma(r, g, b),
        }
    }

    /// Brightness of every cell.
    pub fn brightness_grid<S: PixelSource + ?Sized>(&self, src: &S) -> ScalarGrid {
        let mut grid = ScalarGrid::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                grid.set(x, y, self.cell(src, x, y).brightness);
            }
        }
        grid
    }

    /// Inverted Sobel magnitude per cell: strong edges approach 0 (dark
    /// glyphs), flat areas 1. The one-cell border is 0.
    pub fn edge_grid<S: PixelSource + ?Sized>(&self, src: &S) -> ScalarGrid {
        sobel(&self.brightness_grid(src))
    }
}

/// 3x3 Sobel over a brightness grid, normalized as `1 - min(2 * |G|, 1)`.
pub fn sobel(gray: &ScalarGrid) -> ScalarGrid {
    let (width, height) = (gray.width(), gray.height());
    let mut edges = ScalarGrid::new(width, height);
    if width < 3 || height < 3 {
        return edges;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let p = |dx: usize, dy: usize| gray.get(x + dx - 1, y + dy - 1);

            let gx = -p(0, 0) + p(2, 0) - 2.0 * p(0, 1) + 2.0 * p(2, 1) - p(0, 2) + p(2, 2);
            let gy = -p(0, 0) - 2.0 * p(1, 0) - p(2, 0) + p(0, 2) + 2.0 * p(1, 2) + p(2, 2);

            let magnitude = (gx * gx + gy * gy).sqrt();
            edges.set(x, y, 1.0 - (magnitude * 2.0).min(1.0));
        }
    }
    edges
}
