//! Writing archive members to disk

use crate::utils::create_progress_bar;
use anyhow::{Context, Result, bail};
use mpq_archive::Archive;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Extract every listed file below `output_dir`
pub fn extract_all<R: Read + Seek>(
    archive: &mut Archive<R>,
    output_dir: &Path,
    force_decompress: bool,
    quiet: bool,
) -> Result<()> {
    let names = archive.file_names().to_vec();
    if names.is_empty() {
        log::warn!("Archive has no (listfile); nothing to extract");
        return Ok(());
    }

    let pb = create_progress_bar(names.len() as u64, "Extracting files", quiet);
    let mut failed = 0usize;

    for name in &names {
        pb.set_message(format!("Extracting: {name}"));

        let data = archive
            .read_file_with(name, force_decompress)
            .with_context(|| format!("Failed to extract {name}"));
        match data.and_then(|data| write_member(output_dir, name, &data)) {
            Ok(path) => log::debug!("Wrote {}", path.display()),
            Err(e) => {
                pb.suspend(|| log::warn!("{e:#}"));
                failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Extraction complete");

    if failed > 0 {
        bail!("{failed} of {} files could not be extracted", names.len());
    }
    Ok(())
}

fn write_member(output_dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf> {
    let path = output_path(output_dir, name)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Map an archive name onto a path below `output_dir`.
///
/// Both `\` and `/` separate components. Absolute names, drive prefixes and
/// `..` components are rejected.
pub fn output_path(output_dir: &Path, name: &str) -> Result<PathBuf> {
    if name.starts_with(['\\', '/']) || name.get(1..2) == Some(":") {
        bail!("refusing to extract absolute path {name:?}");
    }

    let mut path = output_dir.to_path_buf();
    let mut components = 0;
    for component in name.split(['\\', '/']) {
        match component {
            "" | "." => {}
            ".." => bail!("refusing to extract {name:?}: parent directory component"),
            part => {
                path.push(part);
                components += 1;
            }
        }
    }

    if components == 0 {
        bail!("refusing to extract {name:?}: empty path");
    }
    Ok(path)
}
