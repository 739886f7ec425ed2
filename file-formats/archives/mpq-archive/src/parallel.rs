//! Concurrent extraction helpers
//!
//! [`ParallelArchive`] decodes the tables once and gives every rayon task its
//! own file handle, so reads never contend on a shared seek position.
//! [`SharedArchive`] instead serializes callers over a single handle.

use crate::archive::{ArchiveTables, OpenOptions, open_file};
use crate::extract::FileExtractor;
use crate::{Archive, Result};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only view of an archive for parallel extraction
///
/// ```no_run
/// use mpq_archive::ParallelArchive;
///
/// let archive = ParallelArchive::open("data.mpq")?;
/// for (name, result) in archive.extract_all_parallel() {
///     println!("{name}: {:?}", result.map(|data| data.len()));
/// }
/// # Ok::<(), mpq_archive::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ParallelArchive {
    path: PathBuf,
    tables: Arc<ArchiveTables>,
    options: OpenOptions,
}

impl ParallelArchive {
    /// Open an archive with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, OpenOptions::default())
    }

    /// Open an archive with specific options
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let archive = Archive::open_with_options(path.as_ref(), options)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            tables: archive.tables(),
            options: archive.options().clone(),
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names from `(listfile)`
    pub fn file_names(&self) -> &[String] {
        self.tables.file_names()
    }

    /// Number of worker threads rayon will use
    pub fn thread_count(&self) -> usize {
        rayon::current_num_threads()
    }

    /// Read one file through a freshly opened handle
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let mut reader = open_file(&self.path)?;
        FileExtractor::new(&mut reader, &self.tables, &self.options).extract(name, false)
    }

    /// Extract the given files in parallel, failing on the first error.
    ///
    /// Results keep the order of `names`.
    pub fn extract_files_parallel(&self, names: &[&str]) -> Result<Vec<(String, Vec<u8>)>> {
        names
            .par_iter()
            .map(|&name| Ok((name.to_string(), self.read_file(name)?)))
            .collect()
    }

    /// Extract every listed file in parallel, keeping per-file outcomes
    pub fn extract_all_parallel(&self) -> Vec<(String, Result<Vec<u8>>)> {
        self.tables
            .file_names()
            .par_iter()
            .map(|name| (name.clone(), self.read_file(name)))
            .collect()
    }
}

/// An archive whose single handle is shared between threads behind a mutex
#[derive(Debug)]
pub struct SharedArchive<R> {
    inner: Mutex<Archive<R>>,
    tables: Arc<ArchiveTables>,
}

impl<R: Read + Seek> SharedArchive<R> {
    /// Wrap an opened archive
    pub fn new(archive: Archive<R>) -> Self {
        let tables = archive.tables();
        Self {
            inner: Mutex::new(archive),
            tables,
        }
    }

    /// Names from `(listfile)`; no lock is taken
    pub fn file_names(&self) -> &[String] {
        self.tables.file_names()
    }

    /// Read a file while holding the lock
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.inner.lock().read_file(name)
    }

    /// Run `f` with exclusive access to the archive
    pub fn with_archive<T>(&self, f: impl FnOnce(&mut Archive<R>) -> T) -> T {
        f(&mut self.inner.lock())
    }

    /// Unwrap the archive
    pub fn into_inner(self) -> Archive<R> {
        self.inner.into_inner()
    }
}
