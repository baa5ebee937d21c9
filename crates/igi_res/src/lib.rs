//! This library handles reading the **RES** resource archives used by *Project I.G.I.*.
//!
//! # RES Archive Format Documentation
//!
//! RES files are containers in the chunked **ILFF** format. They bundle game assets, most
//! notably `.tex` textures, into a single file. RES files are typically identified with the
//! `.res` extension.
//!
//! ## File Structure
//!
//! A RES file consists of a header followed by a flat sequence of chunks.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x46464C49 ("ILFF")                               |
//! | 0x0004         | Size                   | 4 bytes: Declared size of the archive                      |
//! | 0x0008         | Alignment              | 4 bytes: Chunk alignment, 4 in every known archive         |
//! | 0x000C         | Reserved               | 4 bytes: Zero                                              |
//! | 0x0010         | Kind                   | 4 bytes: Form type, "IRES" for resource archives           |
//!
//! ### Chunks
//!
//! Every chunk starts with its own header and is followed by its data. The next chunk starts at
//! the following 4 byte boundary, measured from the start of the file.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Id                     | 4 bytes: Chunk identifier                               |
//! | 0x0004         | Length                 | 4 bytes: Size of the data following the header          |
//! | 0x0008         | Alignment              | 4 bytes: Chunk alignment                                |
//! | 0x000C         | Next                   | 4 bytes: Distance to the next chunk, zero for the last  |
//!
//! - **NAME**: A null terminated name applying to the following `BODY` chunk.
//! - **BODY**: The data of a single entry.
//!
//! Chunks with any other id are skipped.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.res`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::{ResArchive, ResDirectory, ResEntry};
pub use types::EntryKind;
pub use write::ResWriter;
