//! Command-line compressor: reads a file (or stdin), writes an XPACK
//! container (or stdout).

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Compress a file into the XPACK container format.
#[derive(Debug, Parser)]
#[command(name = "xpack", version, about)]
struct Args {
    /// Input file; reads stdin if omitted or `-`.
    input: Option<PathBuf>,

    /// Write output to stdout instead of `<input>.xpk`.
    #[arg(short = 'c', long = "stdout")]
    to_stdout: bool,

    /// Keep the input file instead of deleting it after a successful pack.
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Overwrite the output file if it already exists.
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Compression level, 1 (fastest) through 9 (smallest).
    #[arg(short = 'L', long = "level", value_name = "LEVEL", default_value_t = 6)]
    level: u8,

    /// Chunk size in bytes; each chunk is compressed independently.
    #[arg(short = 's', long = "chunk-size", value_name = "BYTES", default_value_t = 1 << 20)]
    chunk_size: u32,

    /// Suffix appended to the output file name.
    #[arg(short = 'S', long = "suffix", value_name = "SUFFIX", default_value = ".xpk")]
    suffix: String,
}

fn run(args: Args) -> Result<(), String> {
    let input_data = match &args.input {
        Some(path) if path != &PathBuf::from("-") => {
            fs::read(path).map_err(|e| format!("reading {}: {e}", path.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| format!("reading stdin: {e}"))?;
            buf
        }
    };

    let packed = xpack::container::pack(&input_data, args.chunk_size, args.level)
        .map_err(|e| format!("compressing: {e}"))?;

    if args.to_stdout || args.input.is_none() {
        io::stdout()
            .write_all(&packed)
            .map_err(|e| format!("writing stdout: {e}"))?;
        return Ok(());
    }

    let input_path = args.input.as_ref().unwrap();
    let output_path = {
        let mut name = input_path.as_os_str().to_owned();
        name.push(&args.suffix);
        PathBuf::from(name)
    };
    if output_path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use -f to overwrite)",
            output_path.display()
        ));
    }
    fs::write(&output_path, &packed)
        .map_err(|e| format!("writing {}: {e}", output_path.display()))?;
    if !args.keep {
        fs::remove_file(input_path).map_err(|e| format!("removing {}: {e}", input_path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::from(0),
        Err(message) => {
            eprintln!("xpack: {message}");
            ExitCode::from(1)
        }
    }
}
