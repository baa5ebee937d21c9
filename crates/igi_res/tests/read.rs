use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};

use igi_res::{
    error::{CorruptArchiveError, Error, Result},
    types::ChunkId,
    EntryKind, ResArchive, ResDirectory, ResWriter,
};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

fn build_archive(entries: &[(&str, &[u8])]) -> Result<Cursor<Vec<u8>>> {
    let mut res = ResWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        res.start_file(name)?;
        res.write_all(data)?;
    }
    let mut out = res.finish()?;
    out.rewind()?;
    Ok(out)
}

#[traced_test]
#[test]
fn listed_names_match_directory_records() -> Result<()> {
    let records: Vec<(&str, &[u8])> = vec![
        ("LOCAL:textures/sky.tex", &b"sky data"[..]),
        ("LOCAL:textures/ground.tex", &b"ground"[..]),
        ("LOCAL:objects/crate.tga", &b"tga"[..]),
        ("LOCAL:sounds/shot.wav", &b""[..]),
        ("readme", &b"odd length"[..]),
    ];

    let archive = ResArchive::new(build_archive(&records)?)?;

    let expected = records.iter().map(|(n, _)| *n).collect::<HashSet<_>>();
    let actual = archive.file_names().collect::<HashSet<_>>();
    assert_eq!(actual, expected);

    Ok(())
}

#[traced_test]
#[test]
fn two_entries_listed_in_directory_order() -> Result<()> {
    let archive = ResArchive::new(build_archive(&[("A.tex", &b"abc"[..]), ("B.tex", &b"xy"[..])])?)?;

    assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["A.tex", "B.tex"]);

    Ok(())
}

#[traced_test]
#[test]
fn entries_read_back() -> Result<()> {
    let records: Vec<(&str, &[u8])> = vec![
        ("first.tex", &[1u8, 2, 3, 4, 5][..]),
        ("second.tga", &[6u8][..]),
        ("third.bin", &[7u8, 8][..]),
    ];

    let mut archive = ResArchive::new(build_archive(&records)?)?;
    assert_eq!(archive.len(), records.len());

    for (name, data) in &records {
        info!("comparing {name}");

        let mut actual = Vec::new();
        archive.by_name(name)?.read_to_end(&mut actual)?;
        assert_eq!(&actual, data);
    }

    let kinds = archive.entries().map(|e| e.kind().clone()).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![EntryKind::Texture, EntryKind::Targa, EntryKind::Other("bin".into())]
    );

    Ok(())
}

#[traced_test]
#[test]
fn foreign_chunks_are_skipped() -> Result<()> {
    let mut res = ResWriter::new(Cursor::new(Vec::new()));
    res.add_chunk(ChunkId(*b"CSTR"), b"ignored");
    res.start_file("kept.tex")?;
    res.write_all(b"kept")?;
    res.add_chunk(ChunkId(*b"PADD"), &[0; 9]);
    res.add_chunk(ChunkId::BODY, b"anonymous");

    let mut out = res.finish()?;
    out.rewind()?;

    let mut archive = ResArchive::new(out)?;
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        vec!["kept.tex", "unnamed_1"]
    );
    assert_eq!(archive.read_entry(1)?, b"anonymous");

    Ok(())
}

#[test]
fn unnamed_bodies_avoid_taken_names() -> Result<()> {
    let mut res = ResWriter::new(Cursor::new(Vec::new()));
    res.start_file("unnamed_1")?;
    res.write_all(b"named")?;
    res.add_chunk(ChunkId::BODY, b"first");
    res.add_chunk(ChunkId::BODY, b"second");
    res.start_file("unnamed_2")?;
    res.write_all(b"also named")?;

    let mut out = res.finish()?;
    out.rewind()?;

    let mut archive = ResArchive::new(out)?;
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        vec!["unnamed_1", "unnamed_1_1", "unnamed_2_1", "unnamed_2"]
    );
    assert_eq!(archive.read_entry(1)?, b"first");
    assert_eq!(archive.read_entry(2)?, b"second");
    assert_eq!(archive.read_entry(3)?, b"also named");
    assert!(archive.by_name("unnamed_1_1")?.entry().name_raw().is_empty());

    Ok(())
}

#[test]
fn truncated_archives_are_corrupt() -> Result<()> {
    let full = build_archive(&[("A.tex", &b"abcdefgh"[..]), ("B.tex", &b"ijklmnop"[..])])?.into_inner();

    for length in 0..full.len() {
        let result = ResArchive::new(Cursor::new(full[..length].to_vec()));
        assert!(
            matches!(result, Err(Error::CorruptArchive(_))),
            "length {length} gave {:?}",
            result.map(|a| a.len())
        );
    }

    Ok(())
}

#[test]
fn directory_from_path_releases_file() -> Result<()> {
    let path = std::env::temp_dir().join(format!("igi_res-{}-directory.res", std::process::id()));
    File::create(&path)?.write_all(build_archive(&[("A.tex", &b"abc"[..])])?.get_ref())?;

    let directory = ResDirectory::from_path(&path)?;
    assert_eq!(directory.len(), 1);

    let entry = directory.get(0).ok_or(Error::CustomError("missing entry".into()))?;
    let data = entry.read_from(&mut File::open(&path)?)?;
    assert_eq!(data, b"abc");

    std::fs::remove_file(&path)?;

    Ok(())
}

#[test]
fn non_archive_is_corrupt() {
    let archive = ResArchive::new(Cursor::new(b"GIF89a\x01\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00"));
    assert!(matches!(
        archive,
        Err(Error::CorruptArchive(CorruptArchiveError::InvalidSignature))
    ));
}
