//! Throughput microbenchmark driver: compresses and decompresses a file
//! (or a synthetic buffer) at each level, reporting MiB/s and ratio. Not a
//! substitute for the Criterion suite under `benches/` — this is the
//! quick, no-dependencies-beyond-the-crate tool for a one-off measurement.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "xbench", version, about)]
struct Args {
    /// File to benchmark; generates a synthetic repetitive buffer if omitted.
    input: Option<PathBuf>,

    /// Only benchmark this level (1..=9); all levels if omitted.
    #[arg(short = 'L', long = "level")]
    level: Option<u8>,
}

fn synthetic_buffer() -> Vec<u8> {
    let phrase = b"the quick brown fox jumps over the lazy dog. ";
    phrase.iter().cycle().take(4 * 1024 * 1024).copied().collect()
}

fn bench_level(data: &[u8], level: u8) {
    let mut compressor = xpack::Compressor::new(data.len().max(1), level).expect("valid level");
    let mut compressed = vec![0u8; data.len() + 4096];

    let start = Instant::now();
    let written = compressor.compress(data, &mut compressed);
    let compress_elapsed = start.elapsed();

    let stored: &[u8] = if written == 0 { data } else { &compressed[..written] };
    let ratio = data.len() as f64 / stored.len() as f64;
    let compress_mib_s = (data.len() as f64 / (1024.0 * 1024.0)) / compress_elapsed.as_secs_f64();

    if written == 0 {
        println!("level {level:>2}: incompressible, {compress_mib_s:>8.1} MiB/s compress");
        return;
    }

    let mut decompressor = xpack::Decompressor::new(data.len().max(1));
    let mut output = vec![0u8; data.len()];
    let start = Instant::now();
    decompressor
        .decompress(&compressed[..written], &mut output, data.len())
        .expect("round trip must succeed on data we just compressed");
    let decompress_elapsed = start.elapsed();
    let decompress_mib_s = (data.len() as f64 / (1024.0 * 1024.0)) / decompress_elapsed.as_secs_f64();

    assert_eq!(output, data, "xbench produced a lossy round trip at level {level}");

    println!(
        "level {level:>2}: ratio {ratio:>6.2}x  {compress_mib_s:>8.1} MiB/s compress  {decompress_mib_s:>8.1} MiB/s decompress"
    );
}

fn main() {
    let args = Args::parse();
    let data = match &args.input {
        Some(path) => fs::read(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display())),
        None => synthetic_buffer(),
    };

    println!("input: {} bytes", data.len());
    match args.level {
        Some(level) => bench_level(&data, level),
        None => {
            for level in 1..=9 {
                bench_level(&data, level);
            }
        }
    }
}
