//! Reading and writing of TGA images
//!
//! Only true-color images are handled, either uncompressed or run-length encoded.

use binrw::{BinRead, BinWrite};
use bon::Builder;
use std::io::{Cursor, Seek, Write};
use tracing::{debug, instrument};

use crate::{
    error::{CorruptImageError, Error, Result, UnsupportedTgaFormatError},
    image::{Image, PixelFormat},
};

/// Size in bytes of [`TgaHeader`]
pub const TGA_HEADER_SIZE: usize = 18;

/// Image type of uncompressed true-color data
pub const IMAGE_TYPE_TRUE_COLOR: u8 = 2;

/// Image type of run-length encoded true-color data
pub const IMAGE_TYPE_RLE_TRUE_COLOR: u8 = 10;

const DESCRIPTOR_ALPHA_BITS: u8 = 0x0F;
const DESCRIPTOR_RIGHT_TO_LEFT: u8 = 0x10;
const DESCRIPTOR_TOP_TO_BOTTOM: u8 = 0x20;

/// Longest run a single packet can describe
const MAX_PACKET_PIXELS: usize = 128;

/// TGA file header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct TgaHeader {
    /// Length of the image id field following the header
    pub id_length: u8,

    /// 0 when no color map is present, 1 otherwise
    pub color_map_type: u8,

    /// Encoding of the pixel data
    pub image_type: u8,

    /// Index of the first color map entry
    pub color_map_first: u16,

    /// Number of color map entries
    pub color_map_length: u16,

    /// Bits per color map entry
    pub color_map_depth: u8,

    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,

    /// Bits per pixel
    pub pixel_depth: u8,

    /// Alpha channel bits and pixel ordering
    pub descriptor: u8,
}

/// TGA 2.0 footer
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct TgaFooter {
    pub extension_offset: u32,
    pub developer_offset: u32,
    pub signature: [u8; 18],
}

impl Default for TgaFooter {
    fn default() -> Self {
        Self {
            extension_offset: 0,
            developer_offset: 0,
            signature: *b"TRUEVISION-XFILE.\0",
        }
    }
}

/// How pixel data is stored
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TgaCompression {
    /// Stores the pixels as they are
    #[default]
    None,

    /// Run-length encode each scanline
    Rle,
}

/// Bits stored per pixel
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TgaDepth {
    /// Blue, green, red, the alpha channel is dropped
    Bgr24,

    /// Blue, green, red, alpha
    #[default]
    Bgra32,
}

impl TgaDepth {
    fn bytes_per_pixel(self) -> usize {
        match self {
            TgaDepth::Bgr24 => 3,
            TgaDepth::Bgra32 => 4,
        }
    }
}

/// Which row is stored first
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TgaOrigin {
    /// The bottom row comes first, the classic layout
    #[default]
    BottomLeft,

    /// The top row comes first
    TopLeft,
}

/// Options for how the TGA file should be written
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct TgaEncoderOptions {
    #[builder(default)]
    pub compression: TgaCompression,

    #[builder(default)]
    pub depth: TgaDepth,

    #[builder(default)]
    pub origin: TgaOrigin,
}

/// TGA image generator
///
/// ```
/// # fn doit() -> igi_tex::error::Result<()> {
/// use igi_tex::{Image, PixelFormat};
/// use igi_tex::tga::{TgaCompression, TgaEncoder, TgaEncoderOptions};
///
/// let image = Image::new(1, 1, PixelFormat::Rgba8, vec![0xFF, 0x00, 0x00, 0xFF])?;
/// let encoder = TgaEncoder::new(
///     TgaEncoderOptions::builder()
///         .compression(TgaCompression::Rle)
///         .build(),
/// );
///
/// let bytes = encoder.encode_to_vec(&image)?;
/// assert_eq!(bytes[2], 10);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TgaEncoder {
    options: TgaEncoderOptions,
}

impl TgaEncoder {
    pub fn new(options: TgaEncoderOptions) -> Self {
        TgaEncoder { options }
    }

    /// Write `image` to `writer` as a complete TGA file
    #[instrument(skip_all, fields(width = image.width(), height = image.height()), err)]
    pub fn encode<W: Write + Seek>(&self, image: &Image, writer: &mut W) -> Result<()> {
        let (Ok(width), Ok(height)) = (u16::try_from(image.width()), u16::try_from(image.height()))
        else {
            return Err(Error::ImageTooLarge {
                width: image.width(),
                height: image.height(),
            });
        };

        let depth = self.options.depth;
        let mut descriptor = match depth {
            TgaDepth::Bgr24 => 0,
            TgaDepth::Bgra32 => 8,
        };
        if self.options.origin == TgaOrigin::TopLeft {
            descriptor |= DESCRIPTOR_TOP_TO_BOTTOM;
        }

        let header = TgaHeader {
            image_type: match self.options.compression {
                TgaCompression::None => IMAGE_TYPE_TRUE_COLOR,
                TgaCompression::Rle => IMAGE_TYPE_RLE_TRUE_COLOR,
            },
            width,
            height,
            pixel_depth: (depth.bytes_per_pixel() * 8) as u8,
            descriptor,
            ..Default::default()
        };
        debug!(?header, "writing header");
        header.write(writer)?;

        let bgra = image.to_format(PixelFormat::Bgra8);
        let mut rows = bgra.rows().collect::<Vec<_>>();
        if self.options.origin == TgaOrigin::BottomLeft {
            rows.reverse();
        }

        let mut scanline = Vec::with_capacity(width as usize * depth.bytes_per_pixel());
        let mut packed = Vec::new();
        for row in rows {
            scanline.clear();
            row.chunks_exact(4)
                .for_each(|p| scanline.extend_from_slice(&p[..depth.bytes_per_pixel()]));

            match self.options.compression {
                TgaCompression::None => writer.write_all(&scanline)?,
                TgaCompression::Rle => {
                    packed.clear();
                    rle_encode_scanline(&scanline, depth.bytes_per_pixel(), &mut packed);
                    writer.write_all(&packed)?;
                }
            }
        }

        TgaFooter::default().write(writer)?;
        Ok(())
    }

    /// Encode `image` into a new buffer
    pub fn encode_to_vec(&self, image: &Image) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.encode(image, &mut out)?;
        Ok(out.into_inner())
    }
}

/// Run-length encode one scanline, packets never span two scanlines
fn rle_encode_scanline(scanline: &[u8], bpp: usize, out: &mut Vec<u8>) {
    let pixels = scanline.chunks_exact(bpp).collect::<Vec<_>>();

    let mut i = 0;
    while i < pixels.len() {
        let mut run = 1;
        while i + run < pixels.len() && run < MAX_PACKET_PIXELS && pixels[i + run] == pixels[i] {
            run += 1;
        }

        if run > 1 {
            out.push(0x80 | (run - 1) as u8);
            out.extend_from_slice(pixels[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < pixels.len()
            && i - start < MAX_PACKET_PIXELS
            && !(i + 1 < pixels.len() && pixels[i] == pixels[i + 1])
        {
            i += 1;
        }

        out.push((i - start - 1) as u8);
        pixels[start..i].iter().for_each(|p| out.extend_from_slice(p));
    }
}

/// Decode a true-color TGA image into [`PixelFormat::Bgra8`]
///
/// Pixels without alpha are made opaque.
#[instrument(skip_all, fields(size = data.len()), err)]
pub fn decode_tga(data: &[u8]) -> Result<Image> {
    if data.len() < TGA_HEADER_SIZE {
        return Err(CorruptImageError::TruncatedHeader {
            expected: TGA_HEADER_SIZE,
            actual: data.len(),
        }
        .into());
    }

    let header = TgaHeader::read(&mut Cursor::new(&data[..TGA_HEADER_SIZE]))?;
    debug!(?header, "read header");

    let compressed = match header.image_type {
        IMAGE_TYPE_TRUE_COLOR => false,
        IMAGE_TYPE_RLE_TRUE_COLOR => true,
        other => return Err(UnsupportedTgaFormatError::ImageType(other).into()),
    };
    let bpp = match header.pixel_depth {
        24 => 3,
        32 => 4,
        other => return Err(UnsupportedTgaFormatError::PixelDepth(other).into()),
    };
    if header.color_map_type > 1 {
        return Err(UnsupportedTgaFormatError::ColorMapType(header.color_map_type).into());
    }
    if header.descriptor & DESCRIPTOR_RIGHT_TO_LEFT != 0 {
        return Err(UnsupportedTgaFormatError::RightToLeft.into());
    }

    let color_map_len = if header.color_map_type == 1 {
        header.color_map_length as usize * (header.color_map_depth as usize).div_ceil(8)
    } else {
        0
    };
    let start = TGA_HEADER_SIZE + header.id_length as usize + color_map_len;
    let body = data.get(start..).unwrap_or_default();

    let width = header.width as usize;
    let height = header.height as usize;
    let expected = width * height * bpp;

    let stored = if compressed {
        rle_decode(body, bpp, expected)?
    } else {
        body.get(..expected)
            .ok_or(CorruptImageError::TruncatedPixels {
                expected,
                actual: body.len(),
            })?
            .to_vec()
    };

    let has_alpha = bpp == 4 && header.descriptor & DESCRIPTOR_ALPHA_BITS != 0;
    let mut pixels = Vec::with_capacity(width * height * 4);
    let stride = (width * bpp).max(1);
    let mut rows = stored.chunks_exact(stride).collect::<Vec<_>>();
    if header.descriptor & DESCRIPTOR_TOP_TO_BOTTOM == 0 {
        rows.reverse();
    }
    for row in rows {
        for p in row.chunks_exact(bpp) {
            pixels.extend_from_slice(&p[..3]);
            pixels.push(if has_alpha { p[3] } else { 0xFF });
        }
    }

    Image::new(header.width as u32, header.height as u32, PixelFormat::Bgra8, pixels)
}

fn rle_decode(body: &[u8], bpp: usize, expected: usize) -> Result<Vec<u8>> {
    let truncated = |actual: usize| CorruptImageError::TruncatedPixels { expected, actual };

    // a packet expands to at most MAX_PACKET_PIXELS pixels
    let mut out = Vec::with_capacity(expected.min(body.len().saturating_mul(MAX_PACKET_PIXELS)));
    let mut position = 0;
    while out.len() < expected {
        let packet = *body.get(position).ok_or(truncated(out.len()))?;
        position += 1;

        let count = (packet & 0x7F) as usize + 1;
        if packet & 0x80 != 0 {
            let pixel = body
                .get(position..position + bpp)
                .ok_or(truncated(out.len()))?;
            position += bpp;
            (0..count).for_each(|_| out.extend_from_slice(pixel));
        } else {
            let raw = body
                .get(position..position + count * bpp)
                .ok_or(truncated(out.len()))?;
            position += count * bpp;
            out.extend_from_slice(raw);
        }
    }

    out.truncate(expected);
    Ok(out)
}
