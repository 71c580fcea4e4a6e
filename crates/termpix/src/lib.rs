//! # termpix
//!
//! Turns decoded raster images into something a terminal can show.
//!
//! ## Features
//!
//! - **Text rendering**: brightness ramps with optional Sobel edge detection,
//!   24-bit color and dithering, parallelized over rows for large images
//! - **Half blocks**: two pixels per cell with `▀`/`▄`, or truecolor
//!   foreground/background pairs
//! - **Dithering**: ten classic 1-bit algorithms (error diffusion and Bayer)
//! - **Graphics protocols**: Sixel, Kitty, iTerm2, WezTerm and Terminology
//!
//! ## Quick Start
//!
//! ### Rendering an image as text
//!
//! ```ignore
//! use termpix::{render_text, ConversionOptions, SchedulerConfig};
//!
//! let img = image::open("cat.png")?.to_rgba8();
//! let opts = ConversionOptions { width: 60, color: true, ..Default::default() };
//! let art = render_text(&img, &opts, &SchedulerConfig::default())?;
//! print!("{}", art);
//! ```
//!
//! ### Encoding for a graphics-capable terminal
//!
//! ```ignore
//! use termpix::{render, Capabilities, Protocol};
//!
//! let proto = Protocol::detect(&caps);
//! let frame = render(&img, proto, 80)?;
//! print!("{}", frame);
//! ```

use thiserror::Error;

pub mod charset;
pub mod dither;
pub mod options;
pub mod pixel;
pub mod protocol;
pub mod quantize;
pub mod sampler;
pub mod scheduler;

pub use charset::{charset, charset_names, Ramp, DEFAULT_CHARSET};
pub use dither::{contrast_stretch, dither, dither_source, posterize, to_gray, DitherAlgorithm};
pub use options::ConversionOptions;
pub use pixel::{decode, Bounds, PixelSource, RgbaSlice};
pub use protocol::{
    protocol_names, render, Capabilities, ColorLevel, Protocol, SixelOptions,
};
pub use quantize::{quantize, Palette};
pub use scheduler::{render_sequential, render_text, SchedulerConfig};

/// Errors that can occur while rendering or encoding an image.
#[derive(Debug, Error)]
pub enum Error {
    /// Source image or requested grid has no area
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Raw buffer size doesn't match expected size for dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Image bytes could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// PNG re-encoding inside a protocol encoder failed
    #[error("encoding PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// Text protocol handed to the graphics encoder
    #[error("protocol {0} requires text conversion, not image rendering")]
    ProtocolMismatch(Protocol),

    /// Rendering a row panicked; with several failing rows, the lowest one
    #[error("render worker panicked on row {row}: {reason}")]
    WorkerPanicked { row: usize, reason: String },

    /// The render thread pool could not be started
    #[error("failed to start render pool: {0}")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}

/// Result type for termpix operations.
pub type Result<T> = core::result::Result<T, Error>;
