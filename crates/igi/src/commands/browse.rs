use clap::Args;
use igi_tex::{TexDecodeOptions, TgaEncoderOptions};
use miette::{miette, IntoDiagnostic, Result};
use std::{
    io::{BufRead, IsTerminal, Write},
    ops::ControlFlow,
    path::PathBuf,
    str::FromStr,
};
use tracing::debug;

use crate::{commands::res::list::write_entry, logging::Console, session::Session};

const HELP: &str = "\
open <file>          o   open a RES archive
list                 l   list the entries
select <entry>       s   show an entry, by name or index
info                 i   show the size of the current image
export [file]        e   write the current image as TGA
console              d   toggle debug output
help                 h   show this text
exit                 q   leave the browser";

#[derive(Args, Debug, Default, Clone)]
pub struct BrowseArgs {
    /// A RES file to open on start
    #[arg(value_name = "FILE", env = "IGI_RES_FILE")]
    file: Option<PathBuf>,

    /// Ignore pixel data past the end of a texture
    #[arg(long, default_value_t = false)]
    lenient: bool,
}

impl BrowseArgs {
    pub fn handle(&self, console: &mut Console) -> Result<()> {
        let session = Session::new(
            TexDecodeOptions::builder()
                .allow_trailing_data(self.lenient)
                .build(),
        );

        let mut out = std::io::stdout();
        let color = out.is_terminal();
        let mut browser = Browser::new(session, console, color);

        if let Some(file) = &self.file {
            browser.report(BrowserCommand::Open(file.clone()), &mut out)?;
        }

        browser.run(std::io::stdin().lock(), &mut out)
    }
}

/// A single line of browser input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    Open(PathBuf),
    List,
    Select(String),
    Info,
    Export(Option<PathBuf>),
    Console,
    Help,
    Exit,
}

impl FromStr for BrowserCommand {
    type Err = miette::Report;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));
        let argument = Some(argument).filter(|a| !a.is_empty());

        Ok(match command.to_ascii_lowercase().as_str() {
            "open" | "o" => BrowserCommand::Open(
                argument
                    .ok_or(miette!("open needs the path of an archive"))?
                    .into(),
            ),
            "list" | "l" => BrowserCommand::List,
            "select" | "s" => BrowserCommand::Select(
                argument
                    .ok_or(miette!("select needs an entry name or index"))?
                    .into(),
            ),
            "info" | "i" => BrowserCommand::Info,
            "export" | "e" => BrowserCommand::Export(argument.map(PathBuf::from)),
            "console" | "d" => BrowserCommand::Console,
            "help" | "h" | "?" => BrowserCommand::Help,
            "exit" | "quit" | "q" => BrowserCommand::Exit,
            other => {
                return Err(miette!(
                    help = "type help to list the commands",
                    "unknown command {other}"
                ))
            }
        })
    }
}

/// Line driven front end over a [`Session`]
pub struct Browser<'a> {
    session: Session,
    console: &'a mut Console,
    encoder: TgaEncoderOptions,
    color: bool,
}

impl<'a> Browser<'a> {
    pub fn new(session: Session, console: &'a mut Console, color: bool) -> Self {
        Browser {
            session,
            console,
            encoder: TgaEncoderOptions::default(),
            color,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands from `input` until it ends or an exit command is given
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        write!(out, "> ").into_diagnostic()?;
        out.flush().into_diagnostic()?;

        for line in input.lines() {
            let line = line.into_diagnostic()?;
            if !line.trim().is_empty() {
                let flow = match line.parse::<BrowserCommand>() {
                    Ok(command) => self.report(command, out)?,
                    Err(err) => {
                        writeln!(out, "error: {err}").into_diagnostic()?;
                        ControlFlow::Continue(())
                    }
                };
                if flow.is_break() {
                    return Ok(());
                }
            }

            write!(out, "> ").into_diagnostic()?;
            out.flush().into_diagnostic()?;
        }

        writeln!(out).into_diagnostic()?;
        Ok(())
    }

    /// Run `command`, printing its failure instead of returning it
    pub fn report<W: Write>(&mut self, command: BrowserCommand, out: &mut W) -> Result<ControlFlow<()>> {
        match self.execute(command, out) {
            Ok(flow) => Ok(flow),
            Err(err) => {
                writeln!(out, "error: {err}").into_diagnostic()?;
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    fn execute<W: Write>(&mut self, command: BrowserCommand, out: &mut W) -> Result<ControlFlow<()>> {
        debug!(?command, "running");

        match command {
            BrowserCommand::Open(path) => {
                self.session.open(&path)?;
                writeln!(
                    out,
                    "{}: {} entries",
                    path.display(),
                    self.session.entries().count()
                )
                .into_diagnostic()?;
                self.write_info(out)?;
            }
            BrowserCommand::List => {
                if self.session.path().is_none() {
                    return Err(crate::session::SessionError::NoArchive.into());
                }
                for (index, entry) in self.session.entries().enumerate() {
                    write_entry(out, index, entry, self.color).into_diagnostic()?;
                }
            }
            BrowserCommand::Select(selector) => {
                let by_name = self.session.entries().any(|e| e.name() == selector);
                match selector.parse::<usize>() {
                    Ok(index) if !by_name => self.session.select(index)?,
                    _ => self.session.select_name(&selector)?,
                };
                self.write_info(out)?;
            }
            BrowserCommand::Info => self.write_info(out)?,
            BrowserCommand::Export(path) => {
                let path = path.unwrap_or_else(|| self.session.default_export_name().into());
                self.session.export_current(&path, self.encoder)?;
                writeln!(out, "wrote {}", path.display()).into_diagnostic()?;
            }
            BrowserCommand::Console => {
                let level = self.console.toggle()?;
                let state = if self.console.is_debug() { "on" } else { "off" };
                writeln!(out, "console {state} ({level})").into_diagnostic()?;
            }
            BrowserCommand::Help => writeln!(out, "{HELP}").into_diagnostic()?,
            BrowserCommand::Exit => return Ok(ControlFlow::Break(())),
        }

        Ok(ControlFlow::Continue(()))
    }

    fn write_info<W: Write>(&self, out: &mut W) -> Result<()> {
        match (self.session.selected_entry(), self.session.info()) {
            (Some(entry), Some(info)) => writeln!(out, "{}\n{}", entry.name(), info),
            (Some(entry), None) => writeln!(out, "{}\nno image", entry.name()),
            _ => writeln!(out, "nothing selected"),
        }
        .into_diagnostic()
    }
}
