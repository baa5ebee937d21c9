use clap::Args;
use igi_res::ResArchive;
use miette::{Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use super::find_entry;
use crate::commands::create_output;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input RES file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Name or index of the entry
    #[arg(short, long, value_name = "ENTRY")]
    entry: String,

    /// A target file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut res = ResArchive::open(&self.file).context(format!("path: {}", &self.file.display()))?;
        let index = find_entry(res.directory(), &self.entry)?;

        let mut f_res = res.by_index(index)?;
        info!("writing {} to {}", f_res.name(), self.output.display());

        let mut out = create_output(&self.output, self.overwrite)?;
        std::io::copy(&mut f_res, &mut out).into_diagnostic()?;

        Ok(())
    }
}
