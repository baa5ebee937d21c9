//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// image data is corrupt
    #[error("image data is corrupt")]
    CorruptImage(#[from] CorruptImageError),

    /// unsupported tex format
    #[error("unsupported tex format")]
    UnsupportedTexFormat(#[from] UnsupportedTexFormatError),

    /// unsupported tga format
    #[error("unsupported tga format")]
    UnsupportedTgaFormat(#[from] UnsupportedTgaFormatError),

    /// image is too large to be stored as a tga
    #[error("image of {width}x{height} pixels is too large for tga")]
    ImageTooLarge { width: u32, height: u32 },
}

/// Error type describing data that is inconsistent with its own header
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum CorruptImageError {
    /// header is truncated
    #[error("header needs {expected} bytes but only {actual} are present")]
    TruncatedHeader { expected: usize, actual: usize },

    /// pixel data is truncated
    #[error("pixel data needs {expected} bytes but only {actual} are present")]
    TruncatedPixels { expected: usize, actual: usize },

    /// pixel buffer does not match the dimensions
    #[error("pixel buffer holds {actual} bytes but {expected} are required")]
    BufferSize { expected: usize, actual: usize },

    /// dimensions cannot be addressed
    #[error("dimensions {width}x{height} overflow")]
    DimensionOverflow { width: u32, height: u32 },
}

/// Error type describing textures with unusual sizes or layouts
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum UnsupportedTexFormatError {
    /// dimensions out of range
    #[error("dimensions {width}x{height} are outside 1..={max}")]
    Dimensions { width: u16, height: u16, max: u16 },

    /// more pixel data than the dimensions account for
    #[error("{actual} bytes of pixel data where {expected} are expected")]
    TrailingData { expected: usize, actual: usize },
}

/// Error type describing tga variants that cannot be decoded
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum UnsupportedTgaFormatError {
    /// image type {0}
    #[error("image type {0}")]
    ImageType(u8),

    /// pixel depth {0}
    #[error("pixel depth {0}")]
    PixelDepth(u8),

    /// color map type {0}
    #[error("color map type {0}")]
    ColorMapType(u8),

    /// right to left pixel ordering
    #[error("right to left pixel ordering")]
    RightToLeft,
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
