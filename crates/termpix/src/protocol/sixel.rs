//! SIXEL encoder on top of the frequency-bucket palette.
//!
//! The image is cut into 6-pixel bands. Within a band every palette color in
//! use gets one pass over all columns, `$` returns to the band start between
//! colors and `-` advances to the next band.

use super::scale_to_columns;
use crate::pixel::PixelSource;
use crate::quantize::{quantize, Palette, MAX_COLORS};
use crate::Result;
use image::RgbaImage;

/// Options for the SIXEL encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SixelOptions {
    /// Target width in terminal columns (0 keeps the source width).
    pub width_cols: usize,

    /// Maximum number of colors in the palette (2-256).
    pub max_colors: usize,

    /// Collapse runs of more than three identical sixels into `!<n><sixel>`.
    /// Off by default so each column is one byte.
    pub run_length: bool,
}

impl Default for SixelOptions {
    fn default() -> Self {
        Self {
            width_cols: 0,
            max_colors: MAX_COLORS,
            run_length: false,
        }
    }
}

/// Encode an image into a SIXEL string (`ESC P q ... ESC \`).
///
/// # Example
/// ```ignore
/// use termpix::{protocol::encode_sixel, SixelOptions};
///
/// let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([255, 0, 0, 255]));
/// let sixel = encode_sixel(&img, &SixelOptions::default())?;
/// print!("{}", sixel);
/// ```
pub fn encode_sixel<S: PixelSource + ?Sized>(src: &S, opts: &SixelOptions) -> Result<String> {
    let img = scale_to_columns(src, opts.width_cols)?;
    let palette = quantize(&img, opts.max_colors.clamp(2, MAX_COLORS));
    let indices = map_to_palette(&img, &palette);

    Ok(encode_indexed_to_sixel(
        &palette,
        &indices,
        img.width() as usize,
        img.height() as usize,
        opts.run_length,
    ))
}

fn map_to_palette(img: &RgbaImage, palette: &Palette) -> Vec<u8> {
    img.pixels()
        .map(|p| palette.nearest(p[0], p[1], p[2]) as u8)
        .collect()
}

fn encode_indexed_to_sixel(
    palette: &Palette,
    indices: &[u8],
    width: usize,
    height: usize,
    run_length: bool,
) -> String {
    let mut out = String::new();

    // DCS introducer for SIXEL
    out.push('\x1b');
    out.push('P');
    out.push('q');

    // Define palette in RGB percent (0-100)
    for (i, c) in palette.colors().iter().enumerate() {
        let r = (c[0] as u32 * 100) / 255;
        let g = (c[1] as u32 * 100) / 255;
        let b = (c[2] as u32 * 100) / 255;
        out.push('#');
        write_number(&mut out, i);
        out.push_str(";2;");
        write_number(&mut out, r as usize);
        out.push(';');
        write_number(&mut out, g as usize);
        out.push(';');
        write_number(&mut out, b as usize);
    }

    let bands = height.div_ceil(6);
    let mut line: Vec<u8> = Vec::with_capacity(width);

    for band in 0..bands {
        let y0 = band * 6;
        let y_max = usize::min(y0 + 6, height);

        let mut colors_used = [false; MAX_COLORS];
        for &idx in &indices[y0 * width..y_max * width] {
            colors_used[idx as usize] = true;
        }

        for color_index in 0..palette.len() {
            if !colors_used[color_index] {
                continue;
            }

            // Bit n set when row y0 + n has this color
            line.clear();
            line.extend((0..width).map(|x| {
                (y0..y_max)
                    .enumerate()
                    .filter(|&(_, y)| indices[y * width + x] as usize == color_index)
                    .fold(0u8, |bits, (bit, _)| bits | (1 << bit))
            }));

            out.push('#');
            write_number(&mut out, color_index);
            if run_length {
                push_run_length(&mut out, &line);
            } else {
                out.extend(line.iter().map(|&bits| (63 + bits) as char));
            }

            // Carriage return to start of band for next color overlay
            out.push('$');
        }

        // Move to next band
        out.push('-');
    }

    // String terminator: ESC \
    out.push('\x1b');
    out.push('\\');

    out
}

fn push_run_length(out: &mut String, line: &[u8]) {
    let mut x = 0;
    while x < line.len() {
        let bits = line[x];
        let run_len = line[x..].iter().take_while(|&&b| b == bits).count();
        let ch = (63 + bits) as char;
        if run_len > 3 {
            out.push('!');
            write_number(out, run_len);
            out.push(ch);
        } else {
            for _ in 0..run_len {
                out.push(ch);
            }
        }
        x += run_len;
    }
}

/// Number to string without allocation
#[inline]
fn write_number(out: &mut String, mut n: usize) {
    if n == 0 {
        out.push('0');
        return;
    }

    let mut buf = [0u8; 20];
    let mut i = buf.len();

    while n > 0 {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
    }

    out.extend(buf[i..].iter().map(|&d| d as char));
}
