use clap::Args;
use igi_res::ResArchive;
use igi_tex::TgaEncoder;
use miette::{Context, IntoDiagnostic, Result};
use std::{io::BufWriter, path::PathBuf};
use tracing::info;

use super::find_entry;
use crate::{
    commands::{create_output, TgaArgs},
    session::decode_entry,
};

#[derive(Args)]
pub struct ExportArgs {
    /// An input RES file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Name or index of an image entry
    #[arg(short, long, value_name = "ENTRY")]
    entry: String,

    /// A target TGA file, defaults to the entry name in the current directory
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    tga: TgaArgs,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let mut res = ResArchive::open(&self.file).context(format!("path: {}", &self.file.display()))?;
        let index = find_entry(res.directory(), &self.entry)?;

        let directory = res.directory().clone();
        let entry = directory
            .get(index)
            .ok_or(igi_res::error::Error::from(
                igi_res::error::FileNotFoundError::Index(index),
            ))?;

        let data = res.read_entry(index)?;
        let image = decode_entry(entry, &data, &self.tga.decode_options())
            .context(format!("decoding {}", entry.name()))?;

        let output = self.output.clone().unwrap_or_else(|| {
            PathBuf::from(entry.file_name()).with_extension("tga")
        });
        info!(
            "writing {} ({}x{}) to {}",
            entry.name(),
            image.width(),
            image.height(),
            output.display()
        );

        let mut out = BufWriter::new(create_output(&output, self.overwrite)?);
        TgaEncoder::new(self.tga.encoder_options()).encode(&image, &mut out)?;
        std::io::Write::flush(&mut out).into_diagnostic()?;

        Ok(())
    }
}
