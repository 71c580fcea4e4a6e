//! Native terminal graphics protocols.
//!
//! Every encoder first scales the source to the requested column width
//! (about 8 pixels per column, nearest neighbor) and then builds the complete
//! frame in memory. Nothing is written to the terminal from here.

mod iterm;
mod kitty;
mod sixel;
mod terminology;

pub use iterm::{encode_iterm2, encode_wezterm};
pub use kitty::{encode_kitty, KITTY_CHUNK_SIZE};
pub use sixel::{encode_sixel, SixelOptions};
pub use terminology::encode_terminology;

use crate::pixel::{to_rgba_image, PixelSource};
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use log::debug;
use std::fmt;

/// Approximate pixel width of one terminal column.
pub const PIXELS_PER_COLUMN: u32 = 8;

/// How an image is shown in the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Text rendering; handled by [`crate::render_text`], not [`render`]
    #[default]
    Ascii,
    /// DEC Sixel raster graphics
    Sixel,
    /// Kitty graphics protocol
    Kitty,
    /// iTerm2 inline images (OSC 1337)
    ITerm2,
    /// WezTerm, iTerm2-compatible inline images
    WezTerm,
    /// Terminology inline media
    Terminology,
}

impl Protocol {
    /// Parse a protocol name (case-insensitive). `auto` picks from `caps`;
    /// unknown names fall back to [`Protocol::Ascii`].
    pub fn parse(name: &str, caps: &Capabilities) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sixel" | "six" => Protocol::Sixel,
            "kitty" => Protocol::Kitty,
            "iterm2" | "iterm" => Protocol::ITerm2,
            "wezterm" => Protocol::WezTerm,
            "terminology" => Protocol::Terminology,
            "auto" => Protocol::detect(caps),
            _ => Protocol::Ascii,
        }
    }

    /// Best protocol the terminal supports: Kitty, WezTerm, iTerm2,
    /// Terminology, Sixel, in that order, else text.
    pub fn detect(caps: &Capabilities) -> Self {
        if caps.kitty {
            Protocol::Kitty
        } else if caps.wezterm {
            Protocol::WezTerm
        } else if caps.iterm2 {
            Protocol::ITerm2
        } else if caps.terminology {
            Protocol::Terminology
        } else if caps.sixel {
            Protocol::Sixel
        } else {
            Protocol::Ascii
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Protocol::Ascii => "ascii",
            Protocol::Sixel => "sixel",
            Protocol::Kitty => "kitty",
            Protocol::ITerm2 => "iterm2",
            Protocol::WezTerm => "wezterm",
            Protocol::Terminology => "terminology",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names accepted by [`Protocol::parse`], in display order.
pub fn protocol_names() -> &'static [&'static str] {
    &["auto", "ascii", "sixel", "kitty", "iterm2", "wezterm", "terminology"]
}

/// Terminal color depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorLevel {
    #[default]
    NoColor,
    /// 16 colors
    Basic,
    Color256,
    /// 24-bit
    TrueColor,
}

/// What the terminal can display, as reported by the caller's detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub color_level: ColorLevel,
    pub sixel: bool,
    pub kitty: bool,
    pub iterm2: bool,
    pub wezterm: bool,
    pub terminology: bool,
}

impl Capabilities {
    pub fn supports_truecolor(&self) -> bool {
        self.color_level == ColorLevel::TrueColor
    }
}

/// Encode `src` for `protocol`, scaled to `width_cols` terminal columns.
///
/// Returns [`Error::ProtocolMismatch`] for [`Protocol::Ascii`].
pub fn render<S: PixelSource + ?Sized>(
    src: &S,
    protocol: Protocol,
    width_cols: usize,
) -> Result<String> {
    let frame = match protocol {
        Protocol::Ascii => return Err(Error::ProtocolMismatch(protocol)),
        Protocol::Sixel => encode_sixel(
            src,
            &SixelOptions {
                width_cols,
                ..Default::default()
            },
        )?,
        Protocol::Kitty => encode_kitty(src, width_cols)?,
        Protocol::ITerm2 => encode_iterm2(src, width_cols)?,
        Protocol::WezTerm => encode_wezterm(src, width_cols)?,
        Protocol::Terminology => encode_terminology(src, width_cols)?,
    };
    debug!("encoded {} frame: {} bytes", protocol, frame.len());
    Ok(frame)
}

/// Nearest-neighbor downscale to `width_cols * 8` pixels wide, keeping the
/// aspect ratio. Sources already narrow enough are copied unchanged.
pub fn scale_to_columns<S: PixelSource + ?Sized>(src: &S, width_cols: usize) -> Result<RgbaImage> {
    let bounds = src.bounds();
    if bounds.is_empty() {
        return Err(Error::InvalidDimensions {
            width: bounds.width() as usize,
            height: bounds.height() as usize,
        });
    }

    let (orig_w, orig_h) = (bounds.width(), bounds.height());
    let target_w = (width_cols as u64).saturating_mul(PIXELS_PER_COLUMN as u64);
    if target_w == 0 || target_w >= orig_w as u64 {
        return Ok(to_rgba_image(src));
    }

    let scale = target_w as f64 / orig_w as f64;
    let new_w = ((orig_w as f64 * scale) as u32).max(1);
    let new_h = ((orig_h as f64 * scale) as u32).max(1);
    Ok(RgbaImage::from_fn(new_w, new_h, |x, y| {
        let sx = ((x as f64 / scale) as u32).min(orig_w - 1);
        let sy = ((y as f64 / scale) as u32).min(orig_h - 1);
        src.color_at(sx + bounds.min_x, sy + bounds.min_y)
    }))
}

pub(crate) fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .map_err(Error::Encode)?;
    Ok(png)
}

/// PNG-encode and base64 the image.
pub(crate) fn png_base64(img: &RgbaImage) -> Result<String> {
    Ok(STANDARD.encode(encode_png(img)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_parse_names() {
        let caps = Capabilities::default();
        assert_eq!(Protocol::parse("sixel", &caps), Protocol::Sixel);
        assert_eq!(Protocol::parse("SIX", &caps), Protocol::Sixel);
        assert_eq!(Protocol::parse("Kitty", &caps), Protocol::Kitty);
        assert_eq!(Protocol::parse("iterm", &caps), Protocol::ITerm2);
        assert_eq!(Protocol::parse("WEZTERM", &caps), Protocol::WezTerm);
        assert_eq!(Protocol::parse("terminology", &caps), Protocol::Terminology);
        assert_eq!(Protocol::parse("nope", &caps), Protocol::Ascii);
        assert_eq!(Protocol::parse("auto", &caps), Protocol::Ascii);
    }

    #[test]
    fn test_names_parse_back() {
        let caps = Capabilities::default();
        for name in protocol_names().iter().filter(|n| **n != "auto") {
            assert_eq!(Protocol::parse(name, &caps).name(), *name);
        }
    }

    #[test]
    fn test_detect_priority() {
        let all = Capabilities {
            color_level: ColorLevel::TrueColor,
            sixel: true,
            kitty: true,
            iterm2: true,
            wezterm: true,
            terminology: true,
        };
        assert_eq!(Protocol::detect(&all), Protocol::Kitty);
        let caps = Capabilities { kitty: false, ..all };
        assert_eq!(Protocol::detect(&caps), Protocol::WezTerm);
        let caps = Capabilities { wezterm: false, ..caps };
        assert_eq!(Protocol::detect(&caps), Protocol::ITerm2);
        let caps = Capabilities { iterm2: false, ..caps };
        assert_eq!(Protocol::detect(&caps), Protocol::Terminology);
        let caps = Capabilities { terminology: false, ..caps };
        assert_eq!(Protocol::detect(&caps), Protocol::Sixel);
        let caps = Capabilities { sixel: false, ..caps };
        assert_eq!(Protocol::detect(&caps), Protocol::Ascii);
        assert_eq!(Protocol::parse("auto", &all), Protocol::Kitty);
    }

    #[test]
    fn test_ascii_is_rejected() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let err = render(&img, Protocol::Ascii, 10).unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch(Protocol::Ascii)));
        assert!(err.to_string().contains("ascii"));
    }

    #[test]
    fn test_scale_to_columns() {
        let img = RgbaImage::from_fn(256, 128, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let scaled = scale_to_columns(&img, 16).unwrap();
        assert_eq!(scaled.dimensions(), (128, 64));
        assert_eq!(*scaled.get_pixel(10, 5), Rgba([20, 10, 0, 255]));

        // wide enough already, or no width: unchanged
        assert_eq!(scale_to_columns(&img, 32).unwrap(), img);
        assert_eq!(scale_to_columns(&img, 0).unwrap(), img);
    }

    #[test]
    fn test_scale_rejects_empty() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            scale_to_columns(&img, 10),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_png_base64_is_png() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let b64 = png_base64(&img).unwrap();
        // base64 of the PNG signature
        assert!(b64.starts_with("iVBORw0KGgo"));
    }
}
