//! iTerm2 inline images (OSC 1337) and the WezTerm flavor of the same.

use super::{encode_png, png_base64, scale_to_columns};
use crate::pixel::PixelSource;
use crate::Result;
use base64::{engine::general_purpose::STANDARD, Engine};

/// `ESC ]1337;File=inline=1;width=<w>px;height=<h>px;preserveAspectRatio=1:<b64> BEL`
pub fn encode_iterm2<S: PixelSource + ?Sized>(src: &S, width_cols: usize) -> Result<String> {
    let img = scale_to_columns(src, width_cols)?;
    let encoded = png_base64(&img)?;
    Ok(format!(
        "\x1b]1337;File=inline=1;width={}px;height={}px;preserveAspectRatio=1:{}\x07\n",
        img.width(),
        img.height(),
        encoded
    ))
}

/// Same escape as iTerm2, with the PNG byte count announced via `size=`.
pub fn encode_wezterm<S: PixelSource + ?Sized>(src: &S, width_cols: usize) -> Result<String> {
    let img = scale_to_columns(src, width_cols)?;
    let png = encode_png(&img)?;
    Ok(format!(
        "\x1b]1337;File=inline=1;size={};width={}px;height={}px;preserveAspectRatio=1:{}\x07\n",
        png.len(),
        img.width(),
        img.height(),
        STANDARD.encode(&png)
    ))
}
