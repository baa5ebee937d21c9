//! This library decodes the **TEX** textures used by *Project I.G.I.* and converts them to
//! **TGA**.
//!
//! # TEX Format Documentation
//!
//! TEX files are stored inside RES archives. They hold a single uncompressed image.
//!
//! | Offset (bytes) | Field                  | Description                                      |
//! |----------------|------------------------|--------------------------------------------------|
//! | 0x0000         | Words                  | 20 bytes: Five words of unknown purpose          |
//! | 0x0014         | Mode                   | 2 bytes: Unknown                                 |
//! | 0x0016         | Width                  | 2 bytes: Width in pixels                         |
//! | 0x0018         | Height                 | 2 bytes: Height in pixels                        |
//! | 0x001A         | Tail                   | 6 bytes: Unknown                                 |
//! | 0x0020         | Pixels                 | Width × height pixels, 4 bytes each              |
//!
//! Pixels are stored as blue, green, red, alpha with the top row first. The pixel data must
//! account for exactly width × height × 4 bytes.
//!
//! # TGA
//!
//! Decoding covers true-color images (types 2 and 10) at 24 or 32 bits per pixel. Encoding
//! always produces a TGA 2.0 file, see [`tga::TgaEncoderOptions`] for the variants.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod image;
pub mod tex;
pub mod tga;

pub use image::{Image, PixelFormat};
pub use tex::{decode_tex, TexDecodeOptions, TexHeader};
pub use tga::{decode_tga, TgaEncoder, TgaEncoderOptions};
