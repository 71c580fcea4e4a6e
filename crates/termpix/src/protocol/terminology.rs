//! Terminology inline media escape.

use super::{png_base64, scale_to_columns};
use crate::pixel::PixelSource;
use crate::Result;

/// `ESC }is#<w>;<h>;<b64> ESC \` with the scaled pixel size.
pub fn encode_terminology<S: PixelSource + ?Sized>(src: &S, width_cols: usize) -> Result<String> {
    let img = scale_to_columns(src, width_cols)?;
    let encoded = png_base64(&img)?;
    Ok(format!(
        "\x1b}}is#{};{};{}\x1b\\\n",
        img.width(),
        img.height(),
        encoded
    ))
}
