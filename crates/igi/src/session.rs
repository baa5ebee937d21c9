//! State behind the interactive browser
//!
//! A session holds the directory of one archive and at most one decoded image. The archive is
//! only opened for the duration of a single read.

use igi_res::{error::FileNotFoundError, EntryKind, ResDirectory, ResEntry};
use igi_tex::{decode_tex, decode_tga, Image, TexDecodeOptions, TgaEncoder, TgaEncoderOptions};
use miette::Diagnostic;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Seek, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Error type for browser sessions
#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Archive(#[from] igi_res::error::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Image(#[from] igi_tex::error::Error),

    /// The entry is not a texture or targa image
    #[error("{name} is not an image (kind {kind})")]
    #[diagnostic(help("only .tex and .tga entries can be viewed"))]
    UnsupportedEntry { name: String, kind: EntryKind },

    #[error("no archive is open")]
    NoArchive,

    #[error("no image is selected")]
    NoImage,
}

pub type Result<T> = core::result::Result<T, SessionError>;

/// Decode the bytes of `entry` according to its kind
pub fn decode_entry(entry: &ResEntry, data: &[u8], options: &TexDecodeOptions) -> Result<Image> {
    match entry.kind() {
        EntryKind::Texture => Ok(decode_tex(data, options)?),
        EntryKind::Targa => Ok(decode_tga(data)?),
        kind => Err(SessionError::UnsupportedEntry {
            name: entry.name().into(),
            kind: kind.clone(),
        }),
    }
}

#[derive(Debug)]
struct OpenArchive {
    path: PathBuf,
    directory: ResDirectory,
}

#[derive(Debug, Default)]
pub struct Session {
    archive: Option<OpenArchive>,
    selected: Option<usize>,
    current: Option<Image>,
    decode_options: TexDecodeOptions,
}

impl Session {
    pub fn new(decode_options: TexDecodeOptions) -> Self {
        Session {
            decode_options,
            ..Default::default()
        }
    }

    /// Replace the open archive with the one at `path` and show its first entry
    ///
    /// When the archive cannot be read the session is left untouched.
    #[instrument(skip(self), err)]
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let directory = ResDirectory::from_path(path)?;
        info!("opened {} with {} entries", path.display(), directory.len());

        let empty = directory.is_empty();
        self.archive = Some(OpenArchive {
            path: path.to_path_buf(),
            directory,
        });
        self.selected = None;
        self.current = None;

        if !empty {
            if let Err(err) = self.select(0) {
                debug!("first entry not shown: {err}");
            }
        }

        Ok(())
    }

    /// Path of the open archive
    pub fn path(&self) -> Option<&Path> {
        self.archive.as_ref().map(|a| a.path.as_path())
    }

    fn directory(&self) -> Result<&ResDirectory> {
        self.archive
            .as_ref()
            .map(|a| &a.directory)
            .ok_or(SessionError::NoArchive)
    }

    /// Entries of the open archive in directory order
    pub fn entries(&self) -> impl Iterator<Item = &ResEntry> {
        self.archive.iter().flat_map(|a| a.directory.entries())
    }

    /// Decode the entry at `index` and make it the current image
    ///
    /// On failure the current image is cleared and the error is logged, the session stays usable.
    pub fn select(&mut self, index: usize) -> Result<&Image> {
        match self.load(index) {
            Ok(image) => {
                self.selected = Some(index);
                let image: &Image = self.current.insert(image);
                Ok(image)
            }
            Err(err) => {
                error!("unable to show entry {}: {}", index, err);
                self.selected = self
                    .archive
                    .as_ref()
                    .and_then(|a| a.directory.get(index))
                    .map(|_| index);
                self.current = None;
                Err(err)
            }
        }
    }

    /// Same as [`Session::select`] but picks the entry by its full name
    pub fn select_name(&mut self, name: &str) -> Result<&Image> {
        let index = self
            .directory()?
            .index_for_name(name)
            .ok_or(igi_res::error::Error::from(FileNotFoundError::Name(
                name.into(),
            )))?;
        self.select(index)
    }

    fn load(&self, index: usize) -> Result<Image> {
        let archive = self.archive.as_ref().ok_or(SessionError::NoArchive)?;
        let entry = archive
            .directory
            .get(index)
            .ok_or(igi_res::error::Error::from(FileNotFoundError::Index(index)))?;

        let data = entry.read_from(&mut BufReader::new(File::open(&archive.path)?))?;
        decode_entry(entry, &data, &self.decode_options)
    }

    /// The image currently shown
    pub fn current(&self) -> Option<&Image> {
        self.current.as_ref()
    }

    pub fn selected_entry(&self) -> Option<&ResEntry> {
        self.archive.as_ref()?.directory.get(self.selected?)
    }

    /// Dimensions and raw size of the current image
    pub fn info(&self) -> Option<String> {
        let image = self.current()?;
        let entry = self.selected_entry()?;
        Some(format!(
            "{} x {} px\n{:.2} KB",
            image.width(),
            image.height(),
            entry.len() as f64 / 1024.0
        ))
    }

    /// Name suggested when exporting the current image
    pub fn default_export_name(&self) -> String {
        let stem = self
            .selected_entry()
            .map(|e| e.file_name())
            .map(|name| name.rsplit_once('.').map_or(name, |(stem, _)| stem))
            .filter(|stem| !stem.is_empty());

        match stem {
            Some(stem) => format!("{stem}.tga"),
            None => "image.tga".into(),
        }
    }

    /// Encode the current image as TGA into `writer`
    pub fn export_to<W: Write + Seek>(&self, writer: &mut W, options: TgaEncoderOptions) -> Result<()> {
        let image = self.current().ok_or(SessionError::NoImage)?;
        TgaEncoder::new(options).encode(image, writer)?;
        Ok(())
    }

    /// Write the current image to `path` as TGA, replacing any existing file
    #[instrument(skip(self), err)]
    pub fn export_current(&self, path: &Path, options: TgaEncoderOptions) -> Result<()> {
        self.current().ok_or(SessionError::NoImage)?;

        let mut out = BufWriter::new(File::create(path)?);
        self.export_to(&mut out, options)?;
        out.flush()?;

        info!("exported {}", path.display());
        Ok(())
    }
}
