pub mod convert;
pub mod info;

#[derive(clap::Subcommand)]
pub enum TexCommands {
    /// Print the header of a TEX file
    Info(info::InfoArgs),
    /// Convert a TEX file to TGA
    Convert(convert::ConvertArgs),
}

impl TexCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            TexCommands::Info(info) => info.handle(),
            TexCommands::Convert(convert) => convert.handle(),
        }
    }
}
