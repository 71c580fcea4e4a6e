//! Kitty graphics protocol: PNG payload, base64, sent in APC chunks.

use super::{png_base64, scale_to_columns};
use crate::pixel::PixelSource;
use crate::Result;

/// Maximum base64 bytes per APC escape.
pub const KITTY_CHUNK_SIZE: usize = 4096;

/// Encode as a transmit-and-display Kitty frame.
///
/// The first chunk carries `a=T,f=100` (transmit + display, PNG); every chunk
/// carries `m=1` except the last, which carries `m=0`.
pub fn encode_kitty<S: PixelSource + ?Sized>(src: &S, width_cols: usize) -> Result<String> {
    let img = scale_to_columns(src, width_cols)?;
    let encoded = png_base64(&img)?;

    let chunk_count = encoded.len().div_ceil(KITTY_CHUNK_SIZE);
    let mut out = String::with_capacity(encoded.len() + chunk_count * 24 + 1);
    // base64 is ASCII, so byte chunks are valid str slices
    for (i, chunk) in encoded.as_bytes().chunks(KITTY_CHUNK_SIZE).enumerate() {
        let more = u8::from(i + 1 < chunk_count);
        if i == 0 {
            out.push_str("\x1b_Ga=T,f=100,m=");
        } else {
            out.push_str("\x1b_Gm=");
        }
        out.push(char::from(b'0' + more));
        out.push(';');
        out.extend(chunk.iter().map(|&b| b as char));
        out.push_str("\x1b\\");
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_single_chunk() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 255]));
        let out = encode_kitty(&img, 80).unwrap();
        assert!(out.starts_with("\x1b_Ga=T,f=100,m=0;iVBORw0KGgo"));
        assert!(out.ends_with("\x1b\\\n"));
        assert_eq!(out.matches("\x1b_G").count(), 1);
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        // noisy enough that PNG can't compress it below one chunk
        let img = RgbaImage::from_fn(128, 128, |x, y| {
            let mut v = (x << 16 | y).wrapping_mul(0x9e37_79b1);
            v ^= v >> 15;
            v = v.wrapping_mul(0x85eb_ca6b);
            v ^= v >> 13;
            Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255])
        });
        let out = encode_kitty(&img, 0).unwrap();
        let frames: Vec<&str> = out.trim_end().split("\x1b\\").filter(|f| !f.is_empty()).collect();
        assert!(frames.len() >= 2);
        for frame in &frames {
            let payload = frame.split_once(';').map(|(_, p)| p).unwrap();
            assert!(payload.len() <= KITTY_CHUNK_SIZE);
        }
        assert!(frames[0].starts_with("\x1b_Ga=T,f=100,m=1;"));
        assert!(frames[1..frames.len() - 1].iter().all(|f| f.starts_with("\x1b_Gm=1;")));
        assert!(frames[frames.len() - 1].starts_with("\x1b_Gm=0;"));
    }
}
