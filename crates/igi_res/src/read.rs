//! Types for reading ILFF archives
//!

use binrw::BinRead;
use indexmap::IndexMap;
use std::{
    collections::HashSet,
    fmt::{self, Debug},
    fs::File,
    io::{self, BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};
use tracing::{debug, instrument, trace};

use crate::{
    error::{CorruptArchiveError, Error, FileNotFoundError, Result},
    types::{
        base_name, ChunkHeader, ChunkId, EntryKind, ResHeader, CHUNK_ALIGNMENT, CHUNK_HEADER_SIZE,
        HEADER_SIZE,
    },
};

/// Structure representing an entry of a RES archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResEntry {
    name: Box<str>,
    name_raw: Box<[u8]>,
    offset: u64,
    length: u64,
    kind: EntryKind,
}

impl ResEntry {
    /// Get the full name of the entry
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Use [`ResEntry::file_name`] when
    /// deriving an output path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the name of the entry, in the raw (internal) byte representation.
    ///
    /// Empty for bodies that were not preceded by a name chunk.
    pub fn name_raw(&self) -> &[u8] {
        &self.name_raw
    }

    /// Get the name without any directory or drive prefix
    pub fn file_name(&self) -> &str {
        base_name(&self.name)
    }

    /// Get the offset from the start of the archive where the data starts
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Get the size of the entry in bytes
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Whether the entry holds no data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Get the kind inferred from the entry's name
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Read the data of this entry from a reader over the archive it was listed from
    pub fn read_from<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        reader.seek(SeekFrom::Start(self.offset))?;

        let mut buffer = vec![0u8; self.length as usize];
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

/// The parsed directory of a RES archive
///
/// Entries are kept in the order they appear in the archive.
#[derive(Debug, Clone)]
pub struct ResDirectory {
    header: ResHeader,
    entries: IndexMap<Box<str>, ResEntry>,
}

impl ResDirectory {
    /// Parse the directory of the archive at `path`.
    ///
    /// The file is only held open while the directory is read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    /// Parse the directory from a reader positioned anywhere in the archive
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let actual = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = Self::read_header(reader, actual)?;
        debug!(?header, file_size = actual, "read header");

        let declared = header.size as u64;
        if declared > actual {
            return Err(CorruptArchiveError::SizeMismatch { declared, actual }.into());
        }

        // (raw name, offset, length) of every body in chunk order
        let mut bodies: Vec<(Vec<u8>, u64, u64)> = Vec::new();
        let mut names: HashSet<Box<str>> = HashSet::new();
        let mut pending_name: Option<Vec<u8>> = None;
        let mut position = HEADER_SIZE;

        while position < declared {
            if position + CHUNK_HEADER_SIZE > actual {
                return Err(CorruptArchiveError::TruncatedChunk { offset: position }.into());
            }

            reader.seek(SeekFrom::Start(position))?;
            let chunk = ChunkHeader::read(reader)?;

            let data_start = position + CHUNK_HEADER_SIZE;
            let data_end = data_start + chunk.length as u64;
            if data_end > actual {
                return Err(CorruptArchiveError::ChunkOutOfBounds {
                    offset: position,
                    length: chunk.length as u64,
                    end: actual,
                }
                .into());
            }

            trace!(offset = position, id = %chunk.id, length = chunk.length, "chunk");

            match chunk.id {
                ChunkId::NAME => {
                    let mut raw = vec![0u8; chunk.length as usize];
                    reader.read_exact(&mut raw)?;
                    if let Some(end) = raw.iter().position(|&b| b == b'\0') {
                        raw.truncate(end);
                    }
                    pending_name = Some(raw);
                }
                ChunkId::BODY => {
                    let name_raw = pending_name.take().unwrap_or_default();
                    if !name_raw.is_empty() {
                        let name: Box<str> = String::from_utf8_lossy(&name_raw).into();
                        if !names.insert(name.clone()) {
                            return Err(CorruptArchiveError::DuplicateName(name.into()).into());
                        }
                    }
                    bodies.push((name_raw, data_start, chunk.length as u64));
                }
                other => debug!(id = %other, offset = position, "skipping chunk"),
            }

            position = align(data_end);
        }

        let mut entries: IndexMap<Box<str>, ResEntry> = IndexMap::with_capacity(bodies.len());
        for (index, (name_raw, offset, length)) in bodies.into_iter().enumerate() {
            let name: Box<str> = if name_raw.is_empty() {
                let mut name = format!("unnamed_{index}");
                let mut suffix = 0;
                while names.contains(name.as_str()) || entries.contains_key(name.as_str()) {
                    suffix += 1;
                    name = format!("unnamed_{index}_{suffix}");
                }
                name.into()
            } else {
                String::from_utf8_lossy(&name_raw).into()
            };

            let entry = ResEntry {
                kind: EntryKind::from_name(&name),
                name: name.clone(),
                name_raw: name_raw.into(),
                offset,
                length,
            };
            debug!(name = %entry.name, offset = entry.offset, length = entry.length, "entry");
            entries.insert(name, entry);
        }

        Ok(ResDirectory { header, entries })
    }

    fn read_header<R: Read + Seek>(reader: &mut R, actual: u64) -> Result<ResHeader> {
        let mut raw = [0u8; HEADER_SIZE as usize];
        let available = actual.min(HEADER_SIZE) as usize;
        reader.read_exact(&mut raw[..available])?;

        if available < 4 || &raw[..4] != b"ILFF" {
            return Err(CorruptArchiveError::InvalidSignature.into());
        }
        if available < HEADER_SIZE as usize {
            return Err(CorruptArchiveError::TruncatedHeader.into());
        }

        Ok(ResHeader::read(&mut Cursor::new(&raw))?)
    }

    /// The header the directory was read from
    pub fn header(&self) -> &ResHeader {
        &self.header
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all entry names in directory order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_ref())
    }

    /// Returns an iterator over all entries in directory order.
    pub fn entries(&self) -> impl Iterator<Item = &ResEntry> {
        self.entries.values()
    }

    /// Get an entry by its position in the directory
    pub fn get(&self, index: usize) -> Option<&ResEntry> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    /// Get an entry by its full name
    pub fn get_by_name(&self, name: &str) -> Option<&ResEntry> {
        self.entries.get(name)
    }

    /// Get the index of an entry by name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    /// Get the name of an entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.entries
            .get_index(index)
            .map(|(name, _)| name.as_ref())
    }

    /// Total size of the entries in the archive, excluding chunk headers and names.
    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|e| e.length).sum()
    }
}

fn align(position: u64) -> u64 {
    (position + CHUNK_ALIGNMENT - 1) & !(CHUNK_ALIGNMENT - 1)
}

/// A struct for reading an entry from a RES archive
pub struct ResFile<'a, R: Read + Seek> {
    entry: &'a ResEntry,
    reader: io::Take<&'a mut R>,
}

impl<R: Read + Seek> Debug for ResFile<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ResFile({:#?})", self.entry)
    }
}

impl<R: Read + Seek> ResFile<'_, R> {
    /// Get the metadata of the entry being read
    pub fn entry(&self) -> &ResEntry {
        self.entry
    }

    /// Get the full name of the entry
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Get the size of the entry in bytes
    pub fn size(&self) -> u64 {
        self.entry.len()
    }
}

impl<R: Read + Seek> Read for ResFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// RES archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_res_contents(reader: impl Read + Seek) -> igi_res::error::Result<()> {
///     let mut res = igi_res::ResArchive::new(reader)?;
///
///     for i in 0..res.len() {
///         let mut file = res.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct ResArchive<R> {
    reader: R,
    directory: Arc<ResDirectory>,
}

impl ResArchive<BufReader<File>> {
    /// Open and parse the archive at `path`, keeping the file open for reading entries
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        ResArchive::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> ResArchive<R> {
    /// Read a RES archive collecting the entries it contains.
    pub fn new(mut reader: R) -> Result<ResArchive<R>> {
        let directory = ResDirectory::read(&mut reader)?;
        Ok(ResArchive {
            reader,
            directory: directory.into(),
        })
    }

    /// The parsed directory, which can outlive the reader
    pub fn directory(&self) -> &Arc<ResDirectory> {
        &self.directory
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all entry names in directory order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.directory.file_names()
    }

    /// Returns an iterator over all entries in directory order.
    pub fn entries(&self) -> impl Iterator<Item = &ResEntry> {
        self.directory.entries()
    }

    /// Get the index of an entry by name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.directory.index_for_name(name)
    }

    /// Get the name of an entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.directory.name_for_index(index)
    }

    /// Search for an entry by name
    pub fn by_name(&mut self, name: &str) -> Result<ResFile<'_, R>> {
        let Some(index) = self.directory.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained entry by index
    pub fn by_index(&mut self, index: usize) -> Result<ResFile<'_, R>> {
        let entry = self
            .directory
            .get(index)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(index)))?;

        self.reader.seek(SeekFrom::Start(entry.offset))?;
        Ok(ResFile {
            entry,
            reader: self.reader.by_ref().take(entry.length),
        })
    }

    /// Read the whole data of an entry by index
    pub fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .directory
            .get(index)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(index)))?;
        entry.read_from(&mut self.reader)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod test {
    use std::io::prelude::*;

    use crate::{
        error::{CorruptArchiveError, Error, Result},
        read::ResArchive,
        types::EntryKind,
    };
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tracing_test::traced_test;

    #[rustfmt::skip]
    const TWO_ENTRIES: [u8; 108] = [
        // Header (20)
        b'I', b'L', b'F', b'F', 0x6C, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, b'I', b'R', b'E', b'S',
        // NAME (16 + 6 + 2)
        b'N', b'A', b'M', b'E', 0x06, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x18, 0x00, 0x00, 0x00, b'A', b'.', b't', b'e', b'x', 0x00, 0x00, 0x00,
        // BODY (16 + 3 + 1)
        b'B', b'O', b'D', b'Y', 0x03, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x14, 0x00, 0x00, 0x00, b'a', b'b', b'c', 0x00,
        // NAME (16 + 6 + 2)
        b'N', b'A', b'M', b'E', 0x06, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x18, 0x00, 0x00, 0x00, b'B', b'.', b't', b'e', b'x', 0x00, 0x00, 0x00,
        // BODY (16 + 2 + 2)
        b'B', b'O', b'D', b'Y', 0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, b'x', b'y', 0x00, 0x00,
    ];

    #[test]
    fn read_invalid_magic() {
        #[rustfmt::skip]
        let input = [
            b'R', b'I', b'F', b'F', 0x14, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'W', b'A', b'V', b'E',
        ];

        let archive = ResArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::InvalidSignature))
        ));
    }

    #[test]
    fn read_text_file() {
        let archive = ResArchive::new(Cursor::new(b"hello, this is not an archive\n"));
        assert!(matches!(archive, Err(Error::CorruptArchive(_))));
    }

    #[test]
    fn read_empty_file() {
        let archive = ResArchive::new(Cursor::new(Vec::<u8>::new()));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::InvalidSignature))
        ));
    }

    #[test]
    fn read_truncated_header() {
        let archive = ResArchive::new(Cursor::new(*b"ILFF\x14\x00\x00\x00"));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::TruncatedHeader))
        ));
    }

    #[test]
    fn read_empty_archive() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            b'I', b'L', b'F', b'F', 0x14, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'I', b'R', b'E', b'S',
        ];

        let archive = ResArchive::new(Cursor::new(input))?;
        assert!(archive.is_empty());
        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_archive_with_two_entries() -> Result<()> {
        let mut archive = ResArchive::new(Cursor::new(TWO_ENTRIES))?;
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["A.tex", "B.tex"]);

        let mut buffer = Vec::new();

        let mut first = archive.by_index(0)?;
        assert_eq!(first.name(), "A.tex");
        assert_eq!(first.entry().offset(), 36 + 8 + 16);
        assert_eq!(first.entry().kind(), &EntryKind::Texture);
        first.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"abc");
        buffer.clear();

        let mut second = archive.by_name("B.tex")?;
        assert_eq!(second.size(), 2);
        second.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"xy");

        assert_eq!(archive.read_entry(0)?, b"abc");
        assert_eq!(archive.directory().total_size(), 5);

        Ok(())
    }

    #[test]
    fn read_missing_entry() -> Result<()> {
        let mut archive = ResArchive::new(Cursor::new(TWO_ENTRIES))?;

        assert!(matches!(archive.by_index(2), Err(Error::FileNotFound(_))));
        assert!(matches!(archive.by_name("C.tex"), Err(Error::FileNotFound(_))));

        Ok(())
    }

    #[test]
    fn read_declared_size_past_end() {
        let mut input = TWO_ENTRIES;
        input[4] = 0x70;

        let archive = ResArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::SizeMismatch {
                declared: 112,
                actual: 108
            }))
        ));
    }

    #[test]
    fn read_body_past_end() {
        let mut input = TWO_ENTRIES;
        // Second BODY claims 255 bytes
        input[92] = 0xFF;

        let archive = ResArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::ChunkOutOfBounds {
                offset: 88,
                length: 255,
                end: 108
            }))
        ));
    }

    #[test]
    fn read_truncated_chunk_header() {
        let mut input = TWO_ENTRIES.to_vec();
        input.truncate(96);
        input[4] = 96;

        let archive = ResArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::TruncatedChunk { offset: 88 }))
        ));
    }

    #[test]
    fn read_duplicate_names() {
        let mut input = TWO_ENTRIES;
        // Rename B.tex to A.tex
        input[80] = b'A';

        let archive = ResArchive::new(Cursor::new(input));
        assert!(matches!(
            archive,
            Err(Error::CorruptArchive(CorruptArchiveError::DuplicateName(name))) if name == "A.tex"
        ));
    }

    #[traced_test]
    #[test]
    fn read_unnamed_body_and_foreign_chunk() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            // Header (20)
            b'I', b'L', b'F', b'F', 0x3C, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'I', b'R', b'E', b'S',
            // CSTR (16 + 4)
            b'C', b'S', b'T', b'R', 0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
            // BODY (16 + 4)
            b'B', b'O', b'D', b'Y', 0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'd', b'a', b't', b'a',
        ];

        let mut archive = ResArchive::new(Cursor::new(input))?;
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.name_for_index(0), Some("unnamed_0"));

        let file = archive.by_index(0)?;
        assert!(file.entry().name_raw().is_empty());
        assert_eq!(file.entry().kind(), &EntryKind::Other("".into()));

        assert!(logs_contain("skipping chunk"));

        Ok(())
    }
}
