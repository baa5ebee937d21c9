use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use igi::commands::{browse::BrowseArgs, Commands};
use miette::Result;
use tracing_log::AsTrace;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Without a subcommand the browser is started
    #[command(flatten)]
    browse: BrowseArgs,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();

    let mut console = igi::logging::init(cli.verbose.log_level_filter().as_trace())?;

    match &cli.command {
        Some(command) => command.handle(&mut console),
        None => cli.browse.handle(&mut console),
    }
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory, Parser};

    use super::Cli;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_browse() {
        let cli = Cli::parse_from(["igi"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn subcommands_parse() {
        for args in [
            &["igi", "res", "list", "-f", "a.res"][..],
            &["igi", "res", "extract", "-f", "a.res", "-e", "0", "-o", "out.tex"],
            &["igi", "res", "export", "-f", "a.res", "-e", "A.tex", "--rle", "--lenient"],
            &["igi", "tex", "info", "-f", "a.tex"],
            &["igi", "tex", "convert", "-f", "a.tex", "-o", "a.tga", "--overwrite", "-v"],
            &["igi", "browse", "a.res"],
            &["igi", "browse", "-q"],
        ] {
            let cli = Cli::try_parse_from(args);
            assert!(cli.is_ok(), "{args:?}");
            assert!(cli.unwrap().command.is_some());
        }
    }
}
