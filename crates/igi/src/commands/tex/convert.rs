use clap::Args;
use igi_tex::{decode_tex, TgaEncoder};
use miette::{Context, IntoDiagnostic, Result};
use std::{io::BufWriter, path::PathBuf};
use tracing::info;

use crate::commands::{create_output, TgaArgs};

#[derive(Args)]
pub struct ConvertArgs {
    /// An input TEX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target TGA file, defaults to the input with a .tga extension
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    tga: TgaArgs,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let image = decode_tex(&data, &self.tga.decode_options())
            .context(format!("decoding {}", &self.file.display()))?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| self.file.with_extension("tga"));
        info!("writing {}", output.display());

        let mut out = BufWriter::new(create_output(&output, self.overwrite)?);
        TgaEncoder::new(self.tga.encoder_options()).encode(&image, &mut out)?;
        std::io::Write::flush(&mut out).into_diagnostic()?;

        Ok(())
    }
}
