use clap::Args;
use igi_res::{EntryKind, ResDirectory, ResEntry};
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::{
    io::{IsTerminal, Write},
    path::PathBuf,
};
use tracing::info;

#[derive(Args)]
pub struct ListArgs {
    /// An input RES file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

/// Write one line describing `entry`
pub(crate) fn write_entry<W: Write>(
    out: &mut W,
    index: usize,
    entry: &ResEntry,
    color: bool,
) -> std::io::Result<()> {
    let kind = format!("{:<4}", entry.kind());
    let kind = match entry.kind() {
        _ if !color => kind,
        EntryKind::Texture => kind.green().to_string(),
        EntryKind::Targa => kind.cyan().to_string(),
        EntryKind::Other(_) => kind.dimmed().to_string(),
    };

    writeln!(
        out,
        "{:>5}  {}  {:>10}  {:>10}  {}",
        index,
        kind,
        entry.offset(),
        entry.len(),
        entry.name()
    )
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let directory = ResDirectory::from_path(&self.file)
            .context(format!("path: {}", &self.file.display()))?;

        info!(
            "{} holds {} entries, {} bytes",
            self.file.display(),
            directory.len(),
            directory.total_size()
        );

        let color = std::io::stdout().is_terminal();
        let mut out = std::io::stdout().lock();
        for (index, entry) in directory.entries().enumerate() {
            write_entry(&mut out, index, entry, color).into_diagnostic()?;
        }

        Ok(())
    }
}
