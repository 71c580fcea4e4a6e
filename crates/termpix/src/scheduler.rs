//! Text rendering, sequential or split across a fixed pool of row workers.
//!
//! Both paths render rows with the same code and the parallel path reassembles
//! them by row index, so the output is byte-identical whichever path runs.

use crate::charset::Ramp;
use crate::dither::{dither_grid, DitherAlgorithm};
use crate::options::ConversionOptions;
use crate::pixel::PixelSource;
use crate::sampler::{Cell, Sampler, ScalarGrid};
use crate::{Error, Result};
use log::{debug, trace};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Source pixel count from which rendering goes parallel (500x500).
pub const DEFAULT_THRESHOLD: usize = 500 * 500;

/// Fewer rows than this per worker and the split is not worth it.
const MIN_ROWS_PER_WORKER: usize = 10;

/// Upper half block: foreground paints the top half, background the bottom.
const UPPER_HALF: char = '\u{2580}';
const LOWER_HALF: char = '\u{2584}';
const FULL_BLOCK: char = '\u{2588}';

/// Tuning for [`render_text`]. Build once and reuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    workers: usize,
    threshold: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SchedulerConfig {
    /// Both values are clamped to at least 1.
    pub fn new(workers: usize, threshold: usize) -> Self {
        Self {
            workers: workers.max(1),
            threshold: threshold.max(1),
        }
    }

    #[must_use]
    pub fn with_workers(self, workers: usize) -> Self {
        Self::new(workers, self.threshold)
    }

    #[must_use]
    pub fn with_threshold(self, threshold: usize) -> Self {
        Self::new(self.workers, threshold)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// Render `src` as text, one line per grid row, each terminated by `\n`.
///
/// Sources with at least `config.threshold()` pixels are rendered on a pool
/// of `config.workers()` threads; smaller ones on the calling thread. A row
/// whose rendering panics yields [`Error::WorkerPanicked`] for the lowest
/// such row, on either path.
pub fn render_text<S: PixelSource + ?Sized>(
    src: &S,
    opts: &ConversionOptions,
    config: &SchedulerConfig,
) -> Result<String> {
    let pixels = src.bounds().area();
    let job = RowRenderer::new(src, opts)?;
    if pixels < config.threshold {
        debug!(
            "rendering {}x{} sequentially ({} px below threshold {})",
            job.width(),
            job.lines(),
            pixels,
            config.threshold
        );
        return job.render_all();
    }
    render_parallel(&job, config.workers)
}

/// Render on the calling thread regardless of size.
pub fn render_sequential<S: PixelSource + ?Sized>(
    src: &S,
    opts: &ConversionOptions,
) -> Result<String> {
    RowRenderer::new(src, opts)?.render_all()
}

fn render_parallel<S: PixelSource + ?Sized>(
    job: &RowRenderer<'_, S>,
    configured: usize,
) -> Result<String> {
    let lines = job.lines();
    let workers = configured.min(lines).max(1);
    if lines < workers * MIN_ROWS_PER_WORKER {
        debug!(
            "{} rows too few for {} workers, rendering sequentially",
            lines, workers
        );
        return job.render_all();
    }
    debug!("rendering {}x{} with {} workers", job.width(), lines, workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("termpix-row-{i}"))
        .build()
        .map_err(Error::ThreadPool)?;

    // every row runs to completion; results come back in row order
    let rows: Vec<Result<String>> = pool.install(|| {
        (0..lines)
            .into_par_iter()
            .map(|y| {
                trace!("row {y} on worker {:?}", rayon::current_thread_index());
                job.row_checked(y)
            })
            .collect()
    });

    let mut out = String::with_capacity(rows.iter().flatten().map(|l| l.len() + 1).sum());
    for row in rows {
        out.push_str(&row?);
        out.push('\n');
    }
    Ok(out)
}

/// Everything a worker needs to render any row. Shared read-only.
struct RowRenderer<'a, S: ?Sized> {
    src: &'a S,
    sampler: Sampler,
    ramp: Ramp,
    invert: bool,
    color: bool,
    /// Two sampler rows per text line, drawn with half blocks.
    half_block: bool,
    /// Edge and/or dithered values, when the per-cell scalar can't be
    /// computed from the cell alone.
    scalars: Option<ScalarGrid>,
}

impl<'a, S: PixelSource + ?Sized> RowRenderer<'a, S> {
    fn new(src: &'a S, opts: &ConversionOptions) -> Result<Self> {
        let bounds = src.bounds();
        let (width, height) = opts.grid(bounds)?;
        let sample_rows = if opts.half_block { height * 2 } else { height };
        let sampler = Sampler::new(bounds, width, sample_rows);

        let scalars = if opts.edge_detect {
            Some(dither_grid(&sampler.edge_grid(src), opts.dither))
        } else if opts.dither != DitherAlgorithm::None {
            Some(dither_grid(&sampler.brightness_grid(src), opts.dither))
        } else {
            None
        };

        Ok(Self {
            src,
            sampler,
            ramp: opts.ramp(),
            invert: opts.invert,
            color: opts.color && !opts.edge_detect,
            half_block: opts.half_block,
            scalars,
        })
    }

    fn width(&self) -> usize {
        self.sampler.width()
    }

    /// Number of text lines produced.
    fn lines(&self) -> usize {
        if self.half_block {
            self.sampler.height() / 2
        } else {
            self.sampler.height()
        }
    }

    /// Scalar and color of sampler cell `(x, y)`.
    fn sample(&self, scalars: Option<&[f64]>, x: usize, y: usize) -> (f64, Option<Cell>) {
        match scalars {
            Some(row) if !self.color => (row[x], None),
            Some(row) => (row[x], Some(self.sampler.cell(self.src, x, y))),
            None => {
                let cell = self.sampler.cell(self.src, x, y);
                (cell.brightness, Some(cell))
            }
        }
    }

    fn row(&self, y: usize) -> String {
        if self.half_block {
            return self.half_block_row(y);
        }

        let scalars = self.scalars.as_ref().map(|grid| grid.row(y));
        let mut line = String::with_capacity(self.width() * if self.color { 24 } else { 1 });
        for x in 0..self.width() {
            let (brightness, cell) = self.sample(scalars, x, y);
            let glyph = self.ramp.glyph(brightness, self.invert);
            match cell {
                Some(c) if self.color => {
                    push_sgr_rgb(&mut line, "38", &c);
                    line.push(glyph);
                    line.push_str("\x1b[0m");
                }
                _ => line.push(glyph),
            }
        }
        line
    }

    /// Text line `y` covers sampler rows `2y` (top) and `2y + 1` (bottom).
    fn half_block_row(&self, y: usize) -> String {
        let (top_y, bottom_y) = (2 * y, 2 * y + 1);
        let top_scalars = self.scalars.as_ref().map(|grid| grid.row(top_y));
        let bottom_scalars = self.scalars.as_ref().map(|grid| grid.row(bottom_y));

        let mut line = String::with_capacity(self.width() * if self.color { 40 } else { 3 });
        for x in 0..self.width() {
            let (top, top_cell) = self.sample(top_scalars, x, top_y);
            let (bottom, bottom_cell) = self.sample(bottom_scalars, x, bottom_y);
            match (top_cell, bottom_cell) {
                (Some(t), Some(b)) if self.color => {
                    push_sgr_rgb(&mut line, "38", &t);
                    push_sgr_rgb(&mut line, "48", &b);
                    line.push(UPPER_HALF);
                    line.push_str("\x1b[0m");
                }
                _ => {
                    let lit = |v: f64| {
                        let v = if self.invert { 1.0 - v } else { v };
                        v > 0.5
                    };
                    line.push(match (lit(top), lit(bottom)) {
                        (true, true) => FULL_BLOCK,
                        (true, false) => UPPER_HALF,
                        (false, true) => LOWER_HALF,
                        (false, false) => ' ',
                    });
                }
            }
        }
        line
    }

    /// [`Self::row`], with a panic turned into [`Error::WorkerPanicked`].
    fn row_checked(&self, y: usize) -> Result<String> {
        panic::catch_unwind(AssertUnwindSafe(|| self.row(y))).map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Error::WorkerPanicked { row: y, reason }
        })
    }

    fn render_all(&self) -> Result<String> {
        let mut out = String::new();
        for y in 0..self.lines() {
            out.push_str(&self.row_checked(y)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// `ESC [<layer>;2;<r>;<g>;<b>m`, layer 38 for foreground and 48 for background.
fn push_sgr_rgb(out: &mut String, layer: &str, cell: &Cell) {
    out.push_str("\x1b[");
    out.push_str(layer);
    out.push_str(";2");
    for v in [cell.r, cell.g, cell.b] {
        out.push(';');
        if v >= 100 {
            out.push(char::from(b'0' + v / 100));
        }
        if v >= 10 {
            out.push(char::from(b'0' + v / 10 % 10));
        }
        out.push(char::from(b'0' + v % 10));
    }
    out.push('m');
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                ((x + y) * 255 / (width + height)) as u8,
                255,
            ])
        })
    }

    #[test]
    fn test_config_clamps() {
        let config = SchedulerConfig::new(0, 0);
        assert_eq!(config.workers(), 1);
        assert_eq!(config.threshold(), 1);
        let config = SchedulerConfig::default().with_workers(3).with_threshold(42);
        assert_eq!((config.workers(), config.threshold()), (3, 42));
        assert!(SchedulerConfig::default().workers() >= 1);
        assert_eq!(SchedulerConfig::default().threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let img = gradient(120, 90);
        let config = SchedulerConfig::new(4, 1);
        for (edge_detect, color, dither) in [
            (false, false, DitherAlgorithm::None),
            (false, true, DitherAlgorithm::None),
            (true, false, DitherAlgorithm::None),
            (false, true, DitherAlgorithm::Atkinson),
            (true, false, DitherAlgorithm::Bayer4x4),
        ] {
            let opts = ConversionOptions {
                width: 60,
                height: 45,
                edge_detect,
                color,
                dither,
                ..Default::default()
            };
            let parallel = render_text(&img, &opts, &config).unwrap();
            let sequential = render_sequential(&img, &opts).unwrap();
            assert_eq!(parallel, sequential);
            assert_eq!(parallel.lines().count(), 45);
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        let img = gradient(40, 40);
        let opts = ConversionOptions {
            width: 10,
            height: 12,
            ..Default::default()
        };
        let out = render_text(&img, &opts, &SchedulerConfig::new(64, 1)).unwrap();
        assert_eq!(out, render_sequential(&img, &opts).unwrap());
    }

    #[test]
    fn test_color_escapes() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let opts = ConversionOptions {
            width: 2,
            height: 1,
            color: true,
            ..Default::default()
        };
        let out = render_sequential(&img, &opts).unwrap();
        // luma(10, 20, 30) ~ 0.0713 -> index round(0.64) = 1 -> '.'
        assert_eq!(out, "\x1b[38;2;10;20;30m.\x1b[0m\x1b[38;2;10;20;30m.\x1b[0m\n");
    }

    #[test]
    fn test_edge_detect_disables_color() {
        let img = gradient(30, 30);
        let opts = ConversionOptions {
            width: 10,
            height: 10,
            color: true,
            edge_detect: true,
            ..Default::default()
        };
        let out = render_sequential(&img, &opts).unwrap();
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_dither_limits_to_ramp_ends() {
        let img = gradient(64, 64);
        let opts = ConversionOptions {
            width: 32,
            height: 16,
            dither: DitherAlgorithm::FloydSteinberg,
            ..Default::default()
        };
        let out = render_sequential(&img, &opts).unwrap();
        assert!(out.chars().all(|c| c == ' ' || c == '@' || c == '\n'));
        assert!(out.contains(' ') && out.contains('@'));
    }

    /// Panics when asked for any pixel at or below `panic_from`.
    struct Faulty {
        img: RgbaImage,
        panic_from: u32,
    }

    impl PixelSource for Faulty {
        fn bounds(&self) -> crate::Bounds {
            crate::Bounds::from_size(self.img.width(), self.img.height())
        }

        fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
            if y >= self.panic_from {
                panic!("pixel {x},{y} unavailable");
            }
            *self.img.get_pixel(x, y)
        }
    }

    #[test]
    fn test_panicking_row_is_reported() {
        let src = Faulty {
            img: gradient(100, 400),
            panic_from: 300,
        };
        let opts = ConversionOptions {
            width: 10,
            height: 40,
            ..Default::default()
        };

        // 10 source rows per line: lines 30-39 all fail, 30 is reported
        let parallel = render_text(&src, &opts, &SchedulerConfig::new(2, 1));
        match parallel {
            Err(Error::WorkerPanicked { row, reason }) => {
                assert_eq!(row, 30);
                assert!(reason.contains("unavailable"), "reason: {reason}");
            }
            other => panic!("expected WorkerPanicked, got {other:?}"),
        }

        let sequential = render_sequential(&src, &opts);
        assert!(matches!(sequential, Err(Error::WorkerPanicked { row: 30, .. })));
    }

    #[test]
    fn test_half_block_grayscale() {
        // white top half, black bottom half
        let img = RgbaImage::from_fn(4, 4, |_, y| {
            if y < 2 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let opts = ConversionOptions {
            width: 2,
            height: 1,
            half_block: true,
            ..Default::default()
        };
        assert_eq!(render_sequential(&img, &opts).unwrap(), "\u{2580}\u{2580}\n");

        let inverted = ConversionOptions {
            invert: true,
            ..opts.clone()
        };
        assert_eq!(render_sequential(&img, &inverted).unwrap(), "\u{2584}\u{2584}\n");

        let white = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        assert_eq!(render_sequential(&white, &opts).unwrap(), "\u{2588}\u{2588}\n");
    }

    #[test]
    fn test_half_block_color() {
        let img = RgbaImage::from_fn(1, 2, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let opts = ConversionOptions {
            width: 1,
            height: 1,
            color: true,
            half_block: true,
            ..Default::default()
        };
        assert_eq!(
            render_sequential(&img, &opts).unwrap(),
            "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m\u{2580}\x1b[0m\n"
        );
    }

    #[test]
    fn test_half_block_parallel_matches_sequential() {
        let img = gradient(120, 90);
        for color in [false, true] {
            let opts = ConversionOptions {
                width: 60,
                height: 45,
                color,
                half_block: true,
                ..Default::default()
            };
            let parallel = render_text(&img, &opts, &SchedulerConfig::new(4, 1)).unwrap();
            assert_eq!(parallel, render_sequential(&img, &opts).unwrap());
            assert_eq!(parallel.lines().count(), 45);
        }
    }

    #[test]
    fn test_push_sgr_rgb() {
        let mut out = String::new();
        let cell = Cell {
            r: 0,
            g: 7,
            b: 255,
            brightness: 0.0,
        };
        push_sgr_rgb(&mut out, "48", &cell);
        assert_eq!(out, "\x1b[48;2;0;7;255m");
    }
}
