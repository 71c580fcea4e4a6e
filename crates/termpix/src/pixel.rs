//! Read-only pixel access shared by every renderer.

use crate::{Error, Result};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Half-open pixel rectangle `[min_x, max_x) x [min_y, max_y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Bounds {
    /// Bounds anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width,
            max_y: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }
}

/// A decoded image the renderers can sample from.
///
/// Implementations must be pure: `color_at` returns the same value for the
/// same coordinates for as long as the source is borrowed. Coordinates are
/// absolute, i.e. within [`PixelSource::bounds`].
pub trait PixelSource: Sync {
    fn bounds(&self) -> Bounds;

    fn color_at(&self, x: u32, y: u32) -> Rgba<u8>;
}

impl PixelSource for RgbaImage {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    #[inline]
    fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.get_pixel(x, y)
    }
}

impl PixelSource for DynamicImage {
    fn bounds(&self) -> Bounds {
        let (width, height) = self.dimensions();
        Bounds::from_size(width, height)
    }

    #[inline]
    fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
        self.get_pixel(x, y)
    }
}

impl<T: PixelSource + ?Sized> PixelSource for &T {
    fn bounds(&self) -> Bounds {
        (**self).bounds()
    }

    #[inline]
    fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
        (**self).color_at(x, y)
    }
}

/// Borrowed raw RGBA data (4 bytes per pixel, row-major).
#[derive(Clone, Copy, Debug)]
pub struct RgbaSlice<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> RgbaSlice<'a> {
    /// Wrap `rgba` after checking that it holds exactly `width * height` pixels.
    pub fn new(pixels: &'a [u8], width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width > u32::MAX as usize || height > u32::MAX as usize
        {
            return Err(Error::InvalidDimensions { width, height });
        }
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }
}

impl PixelSource for RgbaSlice<'_> {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width as u32, self.height as u32)
    }

    #[inline]
    fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
        let i = (y as usize * self.width + x as usize) * 4;
        let c = &self.pixels[i..i + 4];
        Rgba([c[0], c[1], c[2], c[3]])
    }
}

/// Decode image file bytes (PNG only unless the caller enables more codecs
/// on the `image` crate).
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(Error::Decode)
}

/// Copy any source into an owned, origin-anchored RGBA buffer.
pub(crate) fn to_rgba_image<S: PixelSource + ?Sized>(src: &S) -> RgbaImage {
    let b = src.bounds();
    RgbaImage::from_fn(b.width(), b.height(), |x, y| {
        src.color_at(x + b.min_x, y + b.min_y)
    })
}
