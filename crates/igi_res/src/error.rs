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

    /// file is a corrupt res archive
    #[error("file is a corrupt res archive")]
    CorruptArchive(#[from] CorruptArchiveError),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Error type describing why an archive directory could not be read
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum CorruptArchiveError {
    /// missing ILFF signature
    #[error("missing ILFF signature")]
    InvalidSignature,

    /// header is truncated
    #[error("header is truncated")]
    TruncatedHeader,

    /// declared size exceeds the file
    #[error("declared size {declared} exceeds file size {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    /// chunk header runs past the end of the file
    #[error("chunk header at offset {offset} is truncated")]
    TruncatedChunk { offset: u64 },

    /// chunk data runs past the end of the file
    #[error("chunk at offset {offset} with length {length} runs past end of file at {end}")]
    ChunkOutOfBounds { offset: u64, length: u64, end: u64 },

    /// two entries share a name
    #[error("duplicate entry name {0}")]
    DuplicateName(String),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
