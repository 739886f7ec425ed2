//! Command-line arguments for mpq-tool

use clap::Parser;
use mpq_archive::{ChecksumPolicy, Diagnostics, LookupStrategy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mpq-tool")]
#[command(about = "Inspect and extract MPQ archives", long_about = None)]
#[command(version)]
pub struct Cli {
    /// MPQ archive to read
    pub archive: PathBuf,

    /// Print the user data header and MPQ header
    #[arg(short = 'i', long = "headers")]
    pub headers: bool,

    /// Print the hash table
    #[arg(short = 'H', long)]
    pub hash_table: bool,

    /// Print the block table
    #[arg(short, long)]
    pub block_table: bool,

    /// Print the files named by (listfile), with sizes
    #[arg(short, long)]
    pub list_files: bool,

    /// Extract every file named by (listfile)
    #[arg(short = 'x', long)]
    pub extract: bool,

    /// Directory to extract into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Decompress single-unit files even when their stored size shows no gain
    #[arg(long)]
    pub force_decompress: bool,

    /// Print one line per extracted file
    #[arg(short, long)]
    pub debug: bool,

    /// Fail extraction on sector checksum mismatches
    #[arg(long)]
    pub strict_crc: bool,

    /// Resolve names by scanning the whole hash table
    #[arg(long)]
    pub scan_lookup: bool,

    /// Look for the archive header on every 512-byte boundary
    #[arg(long)]
    pub search_header: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log level requested by `-v`/`-q`, overriding `RUST_LOG`
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        match (self.verbose, self.quiet) {
            (0, false) => None,
            (0, true) => Some(log::LevelFilter::Error),
            (1, _) => Some(log::LevelFilter::Info),
            (2, _) => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        }
    }

    /// Diagnostic events selected by the display flags
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::empty();
        diagnostics.set(Diagnostics::HEADERS, self.headers);
        diagnostics.set(Diagnostics::HASH_TABLE, self.hash_table);
        diagnostics.set(Diagnostics::BLOCK_TABLE, self.block_table);
        diagnostics.set(Diagnostics::FILE_LIST, self.list_files);
        diagnostics.set(Diagnostics::EXTRACTION, self.debug);
        diagnostics
    }

    pub fn checksum_policy(&self) -> ChecksumPolicy {
        if self.strict_crc {
            ChecksumPolicy::Strict
        } else {
            ChecksumPolicy::Report
        }
    }

    pub fn lookup(&self) -> LookupStrategy {
        if self.scan_lookup {
            LookupStrategy::Scan
        } else {
            LookupStrategy::Probe
        }
    }
}
