//! Criterion throughput benchmark for compress/decompress at a spread of
//! levels. Declared `harness = false` in `Cargo.toml`, so this drives
//! `Criterion` directly from `main` instead of the `criterion_main!` macro.

use criterion::{black_box, Criterion, Throughput};

use xpack::{Compressor, Decompressor};

fn text_corpus() -> Vec<u8> {
    let phrase = b"the quick brown fox jumps over the lazy dog. ";
    phrase.iter().cycle().take(1024 * 1024).copied().collect()
}

fn random_corpus() -> Vec<u8> {
    let mut state = 0x2545F4914F6CDD1Du64;
    (0..1024 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

fn bench_compress(c: &mut Criterion, name: &str, data: &[u8]) {
    let mut group = c.benchmark_group(format!("compress/{name}"));
    group.throughput(Throughput::Bytes(data.len() as u64));
    for level in [1u8, 3, 6, 9] {
        group.bench_function(format!("level-{level}"), |b| {
            let mut compressor = Compressor::new(data.len(), level).unwrap();
            let mut out = vec![0u8; data.len() + 4096];
            b.iter(|| black_box(compressor.compress(black_box(data), &mut out)));
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion, name: &str, data: &[u8]) {
    let mut group = c.benchmark_group(format!("decompress/{name}"));
    group.throughput(Throughput::Bytes(data.len() as u64));
    for level in [1u8, 3, 6, 9] {
        let mut compressor = Compressor::new(data.len(), level).unwrap();
        let mut compressed = vec![0u8; data.len() + 4096];
        let written = compressor.compress(data, &mut compressed);
        if written == 0 {
            continue;
        }
        group.bench_function(format!("level-{level}"), |b| {
            let mut decompressor = Decompressor::new(data.len());
            let mut out = vec![0u8; data.len()];
            b.iter(|| {
                decompressor
                    .decompress(black_box(&compressed[..written]), &mut out, data.len())
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn main() {
    let mut criterion = Criterion::default().configure_from_args();

    let text = text_corpus();
    let random = random_corpus();

    bench_compress(&mut criterion, "text", &text);
    bench_compress(&mut criterion, "random", &random);
    bench_decompress(&mut criterion, "text", &text);
    bench_decompress(&mut criterion, "random", &random);

    criterion.final_summary();
}
