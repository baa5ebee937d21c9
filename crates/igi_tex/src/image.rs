//! In-memory pixel buffers shared by the decoders and the encoder.

use std::fmt;

use crate::error::{CorruptImageError, Result};

/// Channel order of an [`Image`]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PixelFormat {
    /// Blue, green, red, alpha. Native order of TEX and TGA data
    #[default]
    Bgra8,

    /// Red, green, blue, alpha
    Rgba8,
}

impl PixelFormat {
    /// Number of bytes used by a single pixel
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }
}

/// A decoded image with rows stored top to bottom
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Image {
    /// Wrap a pixel buffer, which must hold exactly `width * height` pixels
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = Self::buffer_len(width, height, format)?;
        if pixels.len() != expected {
            return Err(CorruptImageError::BufferSize {
                expected,
                actual: pixels.len(),
            }
            .into());
        }

        Ok(Image {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Number of bytes needed to hold an image of the given size
    pub fn buffer_len(width: u32, height: u32, format: PixelFormat) -> Result<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| CorruptImageError::DimensionOverflow { width, height }.into())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The raw pixel buffer in [`Image::format`] order
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Iterate over the rows of the image, top first
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> + ExactSizeIterator {
        let stride = (self.width as usize * self.format.bytes_per_pixel()).max(1);
        self.pixels.chunks_exact(stride)
    }

    /// Get the pixel at `x`, `y` in red, green, blue, alpha order
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let start = (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel();
        let p = &self.pixels[start..start + 4];
        Some(match self.format {
            PixelFormat::Rgba8 => [p[0], p[1], p[2], p[3]],
            PixelFormat::Bgra8 => [p[2], p[1], p[0], p[3]],
        })
    }

    /// Convert the image to another channel order
    pub fn into_format(mut self, format: PixelFormat) -> Image {
        if self.format != format {
            // Both formats are four bytes, only red and blue trade places
            self.pixels.chunks_exact_mut(4).for_each(|p| p.swap(0, 2));
            self.format = format;
        }
        self
    }

    /// Copy the image into another channel order
    pub fn to_format(&self, format: PixelFormat) -> Image {
        self.clone().into_format(format)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
