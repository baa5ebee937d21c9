use clap::Args;
use igi_tex::{tex::TEX_HEADER_SIZE, TexHeader};
use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input TEX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

/// Describe a texture header and how well the payload matches it
pub(crate) fn describe(header: &TexHeader, payload_len: usize) -> String {
    let expected = header.pixel_data_len();
    let payload = match payload_len.cmp(&expected) {
        std::cmp::Ordering::Equal => format!("{payload_len} bytes"),
        std::cmp::Ordering::Less => format!("{payload_len} bytes ({expected} expected, truncated)"),
        std::cmp::Ordering::Greater => {
            format!("{payload_len} bytes ({expected} expected, {} trailing)", payload_len - expected)
        }
    };

    format!(
        "size:    {} x {} px\nmode:    {}\nwords:   {}\ntail:    {}\npayload: {}",
        header.width,
        header.height,
        header.mode,
        header.words.iter().map(|w| format!("{w:#010x}")).join(" "),
        header.tail.iter().map(|w| format!("{w:#06x}")).join(" "),
        payload
    )
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let header = TexHeader::parse(&data)?;

        println!("{}", describe(&header, data.len() - TEX_HEADER_SIZE));

        Ok(())
    }
}
