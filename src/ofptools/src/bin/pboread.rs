use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ofptools::byte_reader::ByteReader;
use ofptools::pbo::{ChecksumMode, FsWriter, PboDecoder};

/// Extracts the contents of a PBO archive.
#[derive(Parser)]
#[command(name = "pboread", version)]
struct Args {
    /// PBO archive to extract.
    pbofile: PathBuf,

    /// Directory to extract into; defaults to the archive's basename with
    /// its extension stripped.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Which window of the decompressed output the trailing checksum
    /// covers (see unpacker docs for why this is configurable).
    #[arg(long, value_enum, default_value_t = ChecksumModeArg::Inclusive)]
    checksum_mode: ChecksumModeArg,

    /// Treat a checksum mismatch as a fatal error instead of a warning.
    #[arg(long)]
    strict_checksum: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChecksumModeArg {
    Inclusive,
    Exact,
}

impl From<ChecksumModeArg> for ChecksumMode {
    fn from(value: ChecksumModeArg) -> Self {
        match value {
            ChecksumModeArg::Inclusive => ChecksumMode::InclusiveExtraByte,
            ChecksumModeArg::Exact => ChecksumMode::Exact,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet)?;

    let output_dir = args.output.clone().unwrap_or_else(|| default_output_dir(&args.pbofile));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("unable to create output directory {}", output_dir.display()))?;

    let mut bytes = Vec::new();
    File::open(&args.pbofile)
        .with_context(|| format!("unable to open {}", args.pbofile.display()))?
        .read_to_end(&mut bytes)?;

    let mut reader = ByteReader::new(Cursor::new(bytes));
    let mut writer = FsWriter::new(&output_dir);
    let decoder = PboDecoder::new(args.checksum_mode.into()).with_strict_checksum(args.strict_checksum);

    let archive = decoder
        .extract_all(&mut reader, &mut writer)
        .with_context(|| format!("failed extracting {}", args.pbofile.display()))?;

    log::info!(
        "extracted {} entries into {}",
        archive.entries.len(),
        output_dir.display()
    );
    Ok(())
}

/// `original_source/pbo_read.c`'s `main()` derives the output directory
/// from the archive's basename with its extension stripped.
fn default_output_dir(pbofile: &std::path::Path) -> PathBuf {
    let stem = pbofile
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| pbofile.as_os_str().to_os_string());
    PathBuf::from(stem)
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
