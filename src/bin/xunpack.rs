//! Command-line decompressor: the inverse of `xpack`. Reads an XPACK
//! container (file or stdin), writes the original bytes back out.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Decompress an XPACK container back into its original bytes.
#[derive(Debug, Parser)]
#[command(name = "xunpack", version, about)]
struct Args {
    /// Input file; reads stdin if omitted or `-`.
    input: Option<PathBuf>,

    /// Write output to stdout instead of stripping the container suffix.
    #[arg(short = 'c', long = "stdout")]
    to_stdout: bool,

    /// Keep the input file instead of deleting it after a successful unpack.
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Overwrite the output file if it already exists.
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Suffix to strip from the input file name when deriving the output name.
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

    let unpacked = xpack::container::unpack(&input_data).map_err(|e| format!("decompressing: {e}"))?;

    if args.to_stdout || args.input.is_none() {
        io::stdout()
            .write_all(&unpacked)
            .map_err(|e| format!("writing stdout: {e}"))?;
        return Ok(());
    }

    let input_path = args.input.as_ref().unwrap();
    let name = input_path.to_string_lossy();
    let stripped = name
        .strip_suffix(args.suffix.as_str())
        .map(PathBuf::from)
        .ok_or_else(|| format!("{} does not end in {}", input_path.display(), args.suffix))?;

    if stripped.exists() && !args.force {
        return Err(format!(
            "{} already exists (use -f to overwrite)",
            stripped.display()
        ));
    }
    fs::write(&stripped, &unpacked).map_err(|e| format!("writing {}: {e}", stripped.display()))?;
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
            eprintln!("xunpack: {message}");
            ExitCode::from(1)
        }
    }
}
