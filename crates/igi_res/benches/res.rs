use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use divan::Bencher;
    use igi_res::{ResArchive, ResWriter};
    use std::io::{prelude::*, Cursor};

    fn get_input() -> Vec<u8> {
        let mut res = ResWriter::new(Cursor::new(Vec::new()));
        for i in 0..512 {
            res.start_file(format!("LOCAL:textures/texture_{i:03}.tex")).unwrap();
            res.write_all(&vec![(i % 251) as u8; 64 * 64 * 4]).unwrap();
        }
        res.finish().unwrap().into_inner()
    }

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(ResArchive::new(Cursor::new(data)).unwrap());
        });
    }

    #[divan::bench(sample_count = 1)]
    fn read_file_all(bencher: Bencher) {
        let mut res = ResArchive::new(Cursor::new(get_input())).unwrap();

        bencher.bench_local(move || {
            let mut buffer = Vec::new();
            for i in 0..res.len() {
                let mut file = res.by_index(i).unwrap();
                file.read_to_end(&mut buffer).unwrap();
                buffer.clear();
            }
        });
    }
}
