//! Decoding of TEX textures

use binrw::{BinRead, BinWrite};
use bon::Builder;
use std::io::Cursor;
use tracing::{debug, instrument};

use crate::{
    error::{CorruptImageError, Result, UnsupportedTexFormatError},
    image::{Image, PixelFormat},
};

/// Size in bytes of [`TexHeader`]
pub const TEX_HEADER_SIZE: usize = 32;

/// Textures wider or taller than this are refused unless configured otherwise
pub const DEFAULT_MAX_DIMENSION: u16 = 8000;

/// Bytes per pixel of TEX pixel data
pub const TEX_BYTES_PER_PIXEL: usize = 4;

/// TEX file header
///
/// Only the dimensions are understood, the remaining fields are carried as-is.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct TexHeader {
    /// Leading words of unknown purpose
    pub words: [u32; 5],

    /// Unknown, varies between textures
    pub mode: u16,

    /// Width of the image in pixels
    pub width: u16,

    /// Height of the image in pixels
    pub height: u16,

    /// Trailing words of unknown purpose
    pub tail: [u16; 3],
}

impl TexHeader {
    /// Parse the header at the start of a texture
    pub fn parse(data: &[u8]) -> Result<TexHeader> {
        if data.len() < TEX_HEADER_SIZE {
            return Err(CorruptImageError::TruncatedHeader {
                expected: TEX_HEADER_SIZE,
                actual: data.len(),
            }
            .into());
        }

        Ok(TexHeader::read(&mut Cursor::new(&data[..TEX_HEADER_SIZE]))?)
    }

    /// Number of pixel bytes the dimensions account for
    pub fn pixel_data_len(&self) -> usize {
        self.width as usize * self.height as usize * TEX_BYTES_PER_PIXEL
    }
}

/// Options for how strictly textures are decoded
#[derive(Debug, Clone, Copy, Builder)]
pub struct TexDecodeOptions {
    /// Largest accepted width or height
    #[builder(default = DEFAULT_MAX_DIMENSION)]
    pub max_dimension: u16,

    /// Ignore pixel data beyond what the dimensions account for instead of refusing the texture
    #[builder(default)]
    pub allow_trailing_data: bool,
}

impl Default for TexDecodeOptions {
    fn default() -> Self {
        TexDecodeOptions::builder().build()
    }
}

/// Decode a TEX texture into an image in [`PixelFormat::Bgra8`]
///
/// ```
/// # fn doit() -> igi_tex::error::Result<()> {
/// use igi_tex::tex::{decode_tex, TexDecodeOptions};
///
/// let mut data = vec![0u8; 32];
/// data[22] = 1; // width
/// data[24] = 1; // height
/// data.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF]);
///
/// let image = decode_tex(&data, &TexDecodeOptions::default())?;
/// assert_eq!(image.rgba_at(0, 0), Some([0xFF, 0x00, 0x00, 0xFF]));
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[instrument(skip_all, fields(size = data.len()), err)]
pub fn decode_tex(data: &[u8], options: &TexDecodeOptions) -> Result<Image> {
    let header = TexHeader::parse(data)?;
    debug!(?header, "read header");

    let (width, height) = (header.width, header.height);
    if width == 0 || height == 0 || width > options.max_dimension || height > options.max_dimension
    {
        return Err(UnsupportedTexFormatError::Dimensions {
            width,
            height,
            max: options.max_dimension,
        }
        .into());
    }

    let payload = &data[TEX_HEADER_SIZE..];
    let expected = header.pixel_data_len();

    if payload.len() < expected {
        return Err(CorruptImageError::TruncatedPixels {
            expected,
            actual: payload.len(),
        }
        .into());
    }

    if payload.len() > expected {
        if !options.allow_trailing_data {
            return Err(UnsupportedTexFormatError::TrailingData {
                expected,
                actual: payload.len(),
            }
            .into());
        }
        debug!(
            trailing = payload.len() - expected,
            "ignoring data past the pixel buffer"
        );
    }

    Image::new(
        width as u32,
        height as u32,
        PixelFormat::Bgra8,
        payload[..expected].to_vec(),
    )
}
