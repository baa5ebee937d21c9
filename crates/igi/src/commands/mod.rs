use clap::Args;
use igi_tex::{
    tga::{TgaCompression, TgaDepth, TgaOrigin},
    TexDecodeOptions, TgaEncoderOptions,
};
use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, path::Path};

use crate::logging::Console;

pub mod browse;
pub mod res;
pub mod tex;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle RES archives
    Res {
        #[command(subcommand)]
        command: res::ResCommands,
    },
    /// Handle loose TEX textures
    Tex {
        #[command(subcommand)]
        command: tex::TexCommands,
    },
    /// Browse a RES archive interactively
    Browse(browse::BrowseArgs),
}

impl Commands {
    pub fn handle(&self, console: &mut Console) -> Result<()> {
        match self {
            Commands::Res { command } => command.handle(),
            Commands::Tex { command } => command.handle(),
            Commands::Browse(browse) => browse.handle(console),
        }
    }
}

/// Options shared by every command producing a TGA file
#[derive(Args, Debug, Default, Clone)]
pub struct TgaArgs {
    /// Run-length encode the output
    #[arg(long, default_value_t = false)]
    rle: bool,

    /// Store the top row first
    #[arg(long, default_value_t = false)]
    top_left: bool,

    /// Drop the alpha channel
    #[arg(long, default_value_t = false)]
    no_alpha: bool,

    /// Ignore pixel data past the end of a texture
    #[arg(long, default_value_t = false)]
    lenient: bool,
}

impl TgaArgs {
    pub fn encoder_options(&self) -> TgaEncoderOptions {
        TgaEncoderOptions::builder()
            .compression(if self.rle {
                TgaCompression::Rle
            } else {
                TgaCompression::None
            })
            .depth(if self.no_alpha {
                TgaDepth::Bgr24
            } else {
                TgaDepth::Bgra32
            })
            .origin(if self.top_left {
                TgaOrigin::TopLeft
            } else {
                TgaOrigin::BottomLeft
            })
            .build()
    }

    pub fn decode_options(&self) -> TexDecodeOptions {
        TexDecodeOptions::builder()
            .allow_trailing_data(self.lenient)
            .build()
    }
}

/// Create an output file, refusing to replace an existing one unless asked to
pub(crate) fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use igi_tex::tga::{TgaCompression, TgaDepth, TgaOrigin};
    use pretty_assertions::assert_eq;

    use super::TgaArgs;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        tga: TgaArgs,
    }

    #[test]
    fn tga_args_map_to_options() {
        let defaults = Wrapper::parse_from(["igi"]).tga;
        let options = defaults.encoder_options();
        assert_eq!(options.compression, TgaCompression::None);
        assert_eq!(options.depth, TgaDepth::Bgra32);
        assert_eq!(options.origin, TgaOrigin::BottomLeft);
        assert!(!defaults.decode_options().allow_trailing_data);

        let all = Wrapper::parse_from(["igi", "--rle", "--top-left", "--no-alpha", "--lenient"]).tga;
        let options = all.encoder_options();
        assert_eq!(options.compression, TgaCompression::Rle);
        assert_eq!(options.depth, TgaDepth::Bgr24);
        assert_eq!(options.origin, TgaOrigin::TopLeft);
        assert!(all.decode_options().allow_trailing_data);
    }
}
