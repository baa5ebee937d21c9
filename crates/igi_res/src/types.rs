//! Base types for structure of ILFF file.

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Size in bytes of [`ResHeader`] including its magic
pub const HEADER_SIZE: u64 = 20;

/// Size in bytes of [`ChunkHeader`]
pub const CHUNK_HEADER_SIZE: u64 = 16;

/// Every chunk starts on this boundary, measured from the start of the file
pub const CHUNK_ALIGNMENT: u64 = 4;

/// ILFF file header
///
/// Defines the header of the ILFF file which always starts with "ILFF".
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"ILFF", little)]
pub struct ResHeader {
    /// The declared size of the archive in bytes
    pub size: u32,

    /// The alignment applied to chunks
    pub alignment: u32,

    /// Always zero in known archives
    pub reserved: u32,

    /// The form type of the archive, `IRES` for resource files
    pub kind: ChunkId,
}

impl Default for ResHeader {
    fn default() -> Self {
        Self {
            size: HEADER_SIZE as u32,
            alignment: CHUNK_ALIGNMENT as u32,
            reserved: 0,
            kind: ChunkId::IRES,
        }
    }
}

/// ILFF chunk header
///
/// Precedes every block of data stored in the archive
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ChunkHeader {
    /// The four character identifier of the chunk
    pub id: ChunkId,

    /// The size of the data following this header
    pub length: u32,

    /// The alignment applied to this chunk
    pub alignment: u32,

    /// The distance from the start of this chunk to the next one, zero for the last chunk
    pub next: u32,
}

/// Four character chunk identifier
#[derive(BinRead, BinWrite, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    /// Holds the name of the following body
    pub const NAME: ChunkId = ChunkId(*b"NAME");

    /// Holds the data of a single entry
    pub const BODY: ChunkId = ChunkId(*b"BODY");

    /// Form type of resource archives
    pub const IRES: ChunkId = ChunkId(*b"IRES");
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .iter()
            .try_for_each(|b| write!(f, "{}", std::ascii::escape_default(*b)))
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId(\"{self}\")")
    }
}

/// The kind of data held by an entry, inferred from the extension of its name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A `.tex` texture
    Texture,

    /// A `.tga` image
    Targa,

    /// Anything else, holding the lowercase extension (possibly empty)
    Other(Box<str>),
}

impl EntryKind {
    /// Infer the kind of an entry from its name
    pub fn from_name(name: &str) -> Self {
        let extension = base_name(name)
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "tex" => EntryKind::Texture,
            "tga" => EntryKind::Targa,
            _ => EntryKind::Other(extension.into()),
        }
    }

    /// Whether entries of this kind can be decoded into an image
    pub fn is_image(&self) -> bool {
        matches!(self, EntryKind::Texture | EntryKind::Targa)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Texture => f.write_str("tex"),
            EntryKind::Targa => f.write_str("tga"),
            EntryKind::Other(ext) if ext.is_empty() => f.write_str("-"),
            EntryKind::Other(ext) => f.write_str(ext),
        }
    }
}

/// Strip any directory or drive prefix from an entry name.
///
/// Archive names mix `/`, `\` and `LOCAL:` style prefixes.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\', ':']).next().unwrap_or(name)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{base_name, ChunkHeader, ChunkId, EntryKind, ResHeader};

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            b'I', b'L', b'F', b'F',
            0x40, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            b'I', b'R', b'E', b'S',
        ]);

        let expected = ResHeader {
            size: 64,
            ..Default::default()
        };

        assert_eq!(ResHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_header_bad_magic() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            b'R', b'I', b'F', b'F',
            0x40, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            b'W', b'A', b'V', b'E',
        ]);

        assert!(matches!(
            ResHeader::read(&mut input),
            Err(binrw::Error::BadMagic { .. })
        ));
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            b'I', b'L', b'F', b'F',
            0x14, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            b'I', b'R', b'E', b'S',
        ];

        let mut actual = Vec::new();
        ResHeader::default().write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_chunk_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            b'B', b'O', b'D', b'Y',
            0x0B, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
        ]);

        let expected = ChunkHeader {
            id: ChunkId::BODY,
            length: 11,
            alignment: 4,
            next: 28,
        };

        assert_eq!(ChunkHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn chunk_id_display_escapes() {
        assert_eq!(ChunkId::NAME.to_string(), "NAME");
        assert_eq!(ChunkId([b'A', 0, b'B', 0xFF]).to_string(), "A\\x00B\\xff");
    }

    #[test]
    fn entry_kind_from_name() {
        assert_eq!(EntryKind::from_name("LOCAL:textures/rock.tex"), EntryKind::Texture);
        assert_eq!(EntryKind::from_name("sky.TGA"), EntryKind::Targa);
        assert_eq!(
            EntryKind::from_name("models/tree.mef"),
            EntryKind::Other("mef".into())
        );
        assert_eq!(EntryKind::from_name("dir.tex/readme"), EntryKind::Other("".into()));
    }

    #[test]
    fn base_name_strips_prefixes() {
        assert_eq!(base_name("LOCAL:textures/rock.tex"), "rock.tex");
        assert_eq!(base_name("a\\b\\c.tga"), "c.tga");
        assert_eq!(base_name("plain.tex"), "plain.tex");
    }
}
