use igi_res::ResDirectory;
use miette::{miette, Result};

pub mod export;
pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum ResCommands {
    /// List the entries of a RES file
    List(list::ListArgs),
    /// Write the raw bytes of one entry
    Extract(extract::ExtractArgs),
    /// Decode one image entry and write it as TGA
    Export(export::ExportArgs),
}

impl ResCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            ResCommands::List(list) => list.handle(),
            ResCommands::Extract(extract) => extract.handle(),
            ResCommands::Export(export) => export.handle(),
        }
    }
}

/// Look up an entry by its full name, falling back to its index
pub(crate) fn find_entry(directory: &ResDirectory, selector: &str) -> Result<usize> {
    directory
        .index_for_name(selector)
        .or_else(|| {
            selector
                .parse::<usize>()
                .ok()
                .filter(|i| *i < directory.len())
        })
        .ok_or(miette!("no entry named {selector}"))
}

#[cfg(test)]
mod test {
    use igi_res::ResDirectory;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Seek, Write};

    use super::find_entry;

    #[test]
    fn find_by_name_or_index() {
        let mut res = igi_res::ResWriter::new(Cursor::new(Vec::new()));
        for name in ["A.tex", "2", "B.tex"] {
            res.start_file(name).unwrap();
            res.write_all(b"x").unwrap();
        }
        let mut data = res.finish().unwrap();
        data.rewind().unwrap();
        let directory = ResDirectory::read(&mut data).unwrap();

        assert_eq!(find_entry(&directory, "B.tex").unwrap(), 2);
        assert_eq!(find_entry(&directory, "0").unwrap(), 0);
        // names win over indices
        assert_eq!(find_entry(&directory, "2").unwrap(), 1);
        assert_eq!(find_entry(&directory, "1").unwrap(), 1);
        assert!(find_entry(&directory, "3").is_err());
        assert!(find_entry(&directory, "C.tex").is_err());
    }
}
