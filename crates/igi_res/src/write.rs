//! Types for writing ILFF archives
//!
//! Used to produce fixtures, existing archives cannot be modified in place.

use binrw::BinWrite;
use std::collections::HashSet;
use std::fmt::Debug;
use std::io::{self, Seek, Write};
use tracing::{instrument, Level};

use crate::error::{Error, Result};
use crate::types::{ChunkHeader, ChunkId, ResHeader, CHUNK_ALIGNMENT, CHUNK_HEADER_SIZE, HEADER_SIZE};

/// RES archive generator
///
/// ```
/// # fn doit() -> igi_res::error::Result<()>
/// # {
/// # use igi_res::ResWriter;
/// use std::io::Write;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut buf = [0; 65536];
/// let mut res = ResWriter::new(std::io::Cursor::new(&mut buf[..]));
///
/// res.start_file("hello_world.txt")?;
/// res.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// res.finish()?;
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ResWriter<W: Write + Seek> {
    inner: W,
    header: ResHeader,
    chunks: Vec<(ChunkId, Vec<u8>)>,
    current_body: Option<Vec<u8>>,
    names: HashSet<String>,
}

impl<W: Write + Seek> ResWriter<W> {
    /// Initializes the archive.
    ///
    /// Before writing to this object, the [`ResWriter::start_file`] function should be called.
    pub fn new(inner: W) -> ResWriter<W> {
        ResWriter {
            inner,
            header: ResHeader::default(),
            chunks: Vec::new(),
            current_body: None,
            names: HashSet::new(),
        }
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.current_body.is_some()
    }

    /// Start a new named entry, finishing the previous one.
    #[instrument(skip(self, name), err)]
    pub fn start_file(&mut self, name: impl ToString) -> Result<()> {
        self.finish_file();

        let name = name.to_string();
        if !self.names.insert(name.clone()) {
            return Err(Error::CustomError(format!("duplicate entry name {name}")));
        }

        let mut raw = name.into_bytes();
        raw.push(b'\0');
        self.chunks.push((ChunkId::NAME, raw));
        self.current_body = Some(Vec::new());

        Ok(())
    }

    /// Append a raw chunk, finishing the current entry first.
    ///
    /// A [`ChunkId::BODY`] added this way has no name.
    pub fn add_chunk(&mut self, id: ChunkId, data: &[u8]) {
        self.finish_file();
        self.chunks.push((id, data.to_vec()));
    }

    fn finish_file(&mut self) {
        if let Some(body) = self.current_body.take() {
            self.chunks.push((ChunkId::BODY, body));
        }
    }

    /// Finish the last file and write the header and every chunk
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.finish_file();

        let padded = |length: usize| -> u64 {
            let total = CHUNK_HEADER_SIZE + length as u64;
            (total + CHUNK_ALIGNMENT - 1) & !(CHUNK_ALIGNMENT - 1)
        };

        let size = HEADER_SIZE
            + self
                .chunks
                .iter()
                .map(|(_, data)| padded(data.len()))
                .sum::<u64>();
        self.header.size = u32::try_from(size)
            .map_err(|_| Error::CustomError(format!("archive size {size} exceeds 4GiB")))?;

        self.header.write(&mut self.inner)?;

        let count = self.chunks.len();
        for (index, (id, data)) in self.chunks.iter().enumerate() {
            let chunk_size = padded(data.len());
            let chunk = ChunkHeader {
                id: *id,
                length: data.len() as u32,
                alignment: CHUNK_ALIGNMENT as u32,
                next: if index + 1 == count { 0 } else { chunk_size as u32 },
            };

            chunk.write(&mut self.inner)?;
            self.inner.write_all(data)?;

            let padding = chunk_size - CHUNK_HEADER_SIZE - data.len() as u64;
            self.inner.write_all(&[0u8; CHUNK_ALIGNMENT as usize][..padding as usize])?;
        }

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for ResWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.current_body.as_mut() {
            Some(body) => body.write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Seek> Debug for ResWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResWriter")
            .field("chunks", &self.chunks.len())
            .field("writing_to_file", &self.is_writing_file())
            .finish()
    }
}
