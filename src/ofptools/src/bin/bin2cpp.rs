use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ofptools::byte_reader::ByteReader;
use ofptools::config::{ConfigDecoder, TextRenderer};

/// Converts a binarized config tree into human-readable text.
#[derive(Parser)]
#[command(name = "bin2cpp", version)]
struct Args {
    /// Binarized config file to decode.
    binfile: PathBuf,

    /// Write output here instead of standard output.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet)?;

    let mut bytes = Vec::new();
    File::open(&args.binfile)
        .with_context(|| format!("unable to open {}", args.binfile.display()))?
        .read_to_end(&mut bytes)?;

    let mut reader = ByteReader::new(Cursor::new(bytes));
    let mut decoder = ConfigDecoder::new();

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut renderer = TextRenderer::new(out);

    decoder
        .decode(&mut reader, &mut renderer)
        .with_context(|| format!("failed decoding {}", args.binfile.display()))?;

    Ok(())
}

fn setup_logging(verbose: u8, quiet: u8) -> Result<()> {
    let level = match verbose as i8 - quiet as i8 {
        i8::MIN..=-1 => log::LevelFilter::Error,
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
