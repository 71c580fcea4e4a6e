use crate::charset::{Ramp, DEFAULT_CHARSET};
use crate::dither::DitherAlgorithm;
use crate::pixel::Bounds;
use crate::{Error, Result};

/// Width used when the caller asks for `0` columns.
pub const DEFAULT_WIDTH: usize = 80;

/// Options for text rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionOptions {
    /// Target width in characters (0 = [`DEFAULT_WIDTH`]).
    pub width: usize,

    /// Target height in characters. 0 derives it from the source aspect
    /// ratio, halved because terminal cells are about twice as tall as wide.
    pub height: usize,

    /// Glyph ramp, dark to light. Empty means [`DEFAULT_CHARSET`].
    pub charset: String,

    /// Project `1 - brightness` instead of brightness (light backgrounds).
    pub invert: bool,

    /// Render Sobel edge strength instead of brightness.
    pub edge_detect: bool,

    /// Wrap each glyph in a 24-bit foreground color escape.
    /// Ignored when `edge_detect` is set.
    pub color: bool,

    /// Quantize the cell grid to two levels before projection.
    pub dither: DitherAlgorithm,

    /// Draw two vertically stacked samples per cell with half-block glyphs
    /// instead of the charset. With `color`, the top sample is the
    /// foreground and the bottom the background of `▀`; otherwise each half
    /// is lit when its value is above 0.5.
    pub half_block: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: 0,
            charset: DEFAULT_CHARSET.to_string(),
            invert: false,
            edge_detect: false,
            color: false,
            dither: DitherAlgorithm::None,
            half_block: false,
        }
    }
}

impl ConversionOptions {
    pub fn ramp(&self) -> Ramp {
        Ramp::new(&self.charset)
    }

    /// Resolve the character grid for a source of the given bounds.
    pub fn grid(&self, bounds: Bounds) -> Result<(usize, usize)> {
        if bounds.is_empty() {
            return Err(Error::InvalidDimensions {
                width: bounds.width() as usize,
                height: bounds.height() as usize,
            });
        }
        let width = if self.width == 0 {
            DEFAULT_WIDTH
        } else {
            self.width
        };
        let height = if self.height == 0 {
            let aspect = bounds.width() as f64 / bounds.height() as f64;
            // very wide sources still get one row
            ((width as f64 / aspect / 2.0) as usize).max(1)
        } else {
            self.height
        };
        Ok((width, height))
    }
}
