//! Command implementations

pub mod extract;

use crate::cli::Cli;
use crate::printer::ConsoleObserver;
use anyhow::{Context, Result};
use mpq_archive::{Archive, OpenOptions};
use std::sync::Arc;

/// Open the archive with the requested diagnostics, then extract if asked
pub fn execute(cli: &Cli) -> Result<()> {
    let options = OpenOptions::new()
        .diagnostics(cli.diagnostics())
        .observer(Arc::new(ConsoleObserver))
        .checksum_policy(cli.checksum_policy())
        .lookup(cli.lookup())
        .search_header(cli.search_header);

    // Tables and the file list are printed by the observer while opening.
    let mut archive = Archive::open_with_options(&cli.archive, options)
        .with_context(|| format!("Failed to open archive {}", cli.archive.display()))?;

    log::info!(
        "Opened {} ({} files listed)",
        cli.archive.display(),
        archive.file_names().len()
    );

    if cli.extract {
        extract::extract_all(&mut archive, &cli.output, cli.force_decompress, cli.quiet)?;
    }

    Ok(())
}
