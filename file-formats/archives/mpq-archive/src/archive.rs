//! MPQ archive handling
//!
//! [`Archive`] owns a byte source and the tables decoded from it. Opening an
//! archive:
//!
//! 1. locates the MPQ header, following a user data header when present,
//! 2. reads and decrypts the hash and block tables,
//! 3. loads the `(listfile)` member to learn file names (its absence is not an
//!    error).
//!
//! The tables are immutable after opening and live behind an [`Arc`], so they
//! can be shared with other readers of the same file.

use crate::diagnostics::{ArchiveObserver, Diagnostics, LogObserver};
use crate::extract::{ChecksumPolicy, FileExtractor};
use crate::header::{self, MpqHeader, UserDataHeader};
use crate::special_files::{LISTFILE_NAME, parse_listfile};
use crate::tables::{BlockEntry, BlockTable, HashTable, LookupStrategy};
use crate::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for opening MPQ archives
///
/// ```no_run
/// use mpq_archive::{Archive, ChecksumPolicy, Diagnostics, OpenOptions};
///
/// let archive = OpenOptions::new()
///     .diagnostics(Diagnostics::HEADERS | Diagnostics::FILE_LIST)
///     .checksum_policy(ChecksumPolicy::Strict)
///     .open("war3map.w3m")?;
/// # Ok::<(), mpq_archive::Error>(())
/// ```
#[derive(Clone)]
pub struct OpenOptions {
    pub(crate) diagnostics: Diagnostics,
    pub(crate) observer: Arc<dyn ArchiveObserver>,
    pub(crate) lookup: LookupStrategy,
    pub(crate) checksum_policy: ChecksumPolicy,
    pub(crate) search_header: bool,
    pub(crate) load_listfile: bool,
    pub(crate) locale: u16,
}

impl OpenOptions {
    /// Create new default options
    ///
    /// No diagnostics, probing lookup, checksum mismatches reported but not
    /// fatal, header expected at offset 0, listfile loaded, neutral locale.
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::empty(),
            observer: Arc::new(LogObserver),
            lookup: LookupStrategy::Probe,
            checksum_policy: ChecksumPolicy::Report,
            search_header: false,
            load_listfile: true,
            locale: 0,
        }
    }

    /// Select which diagnostic events are reported
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Install the observer receiving diagnostic events
    pub fn observer(mut self, observer: Arc<dyn ArchiveObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set how names are resolved against the hash table
    pub fn lookup(mut self, lookup: LookupStrategy) -> Self {
        self.lookup = lookup;
        self
    }

    /// Set how stored sector checksums are treated
    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    /// Search every 512-byte boundary for the header instead of requiring it at offset 0
    pub fn search_header(mut self, search: bool) -> Self {
        self.search_header = search;
        self
    }

    /// Set whether `(listfile)` is read while opening
    pub fn load_listfile(mut self, load: bool) -> Self {
        self.load_listfile = load;
        self
    }

    /// Preferred locale for files stored in several languages
    pub fn locale(mut self, locale: u16) -> Self {
        self.locale = locale;
        self
    }

    /// Open an existing MPQ archive with these options
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Archive> {
        Archive::open_with_options(path, self)
    }

    fn notify(&self, flag: Diagnostics, event: impl FnOnce(&dyn ArchiveObserver)) {
        if self.diagnostics.contains(flag) {
            event(self.observer.as_ref());
        }
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("diagnostics", &self.diagnostics)
            .field("lookup", &self.lookup)
            .field("checksum_policy", &self.checksum_policy)
            .field("search_header", &self.search_header)
            .field("load_listfile", &self.load_listfile)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

/// Headers, tables and file names decoded when an archive is opened
#[derive(Debug)]
pub struct ArchiveTables {
    archive_offset: u64,
    source_len: u64,
    user_data: Option<UserDataHeader>,
    header: MpqHeader,
    hash_table: HashTable,
    block_table: BlockTable,
    file_names: Vec<String>,
}

impl ArchiveTables {
    /// Absolute offset of the MPQ header; file and table positions are relative to it
    pub fn archive_offset(&self) -> u64 {
        self.archive_offset
    }

    /// Length of the byte source the tables were read from
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    /// Optional user data header
    pub fn user_data(&self) -> Option<&UserDataHeader> {
        self.user_data.as_ref()
    }

    /// MPQ header
    pub fn header(&self) -> &MpqHeader {
        &self.header
    }

    /// Decoded hash table
    pub fn hash_table(&self) -> &HashTable {
        &self.hash_table
    }

    /// Decoded block table
    pub fn block_table(&self) -> &BlockTable {
        &self.block_table
    }

    /// Names from `(listfile)`, in file order
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    /// Resolve a name to its hash and block table entries
    pub fn find_file(
        &self,
        filename: &str,
        locale: u16,
        lookup: LookupStrategy,
    ) -> Result<Option<FileInfo>> {
        let Some((hash_index, hash_entry)) = self.hash_table.lookup(filename, locale, lookup) else {
            return Ok(None);
        };

        let block_index = hash_entry.block_index as usize;
        let entry = *self.block_table.get(block_index).ok_or_else(|| {
            Error::corrupt(format!(
                "{filename}: block index {block_index} out of range (block table has {} entries)",
                self.block_table.size()
            ))
        })?;

        Ok(Some(FileInfo {
            filename: filename.to_string(),
            hash_index,
            block_index,
            file_pos: self.archive_offset + u64::from(entry.file_pos),
            locale: hash_entry.locale,
            entry,
        }))
    }
}

type Reopen<R> = Box<dyn Fn() -> io::Result<R> + Send + Sync>;

/// An MPQ archive
pub struct Archive<R = BufReader<File>> {
    path: Option<PathBuf>,
    reader: Option<R>,
    reopen: Option<Reopen<R>>,
    tables: Arc<ArchiveTables>,
    options: OpenOptions,
}

impl Archive {
    /// Open an existing MPQ archive
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, OpenOptions::default())
    }

    /// Open an archive with specific options
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        options.notify(Diagnostics::DEBUG, |o| {
            o.debug(&format!("Loading MPQ archive at path: {}", path.display()));
        });

        let reader = open_file(&path)?;
        let mut archive = Self::from_reader(reader, options)?;

        let reopen_path = path.clone();
        archive.reopen = Some(Box::new(move || {
            File::open(&reopen_path).map(BufReader::new)
        }));
        archive.path = Some(path);
        Ok(archive)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open an archive from any seekable byte source
    pub fn from_reader(mut reader: R, options: OpenOptions) -> Result<Self> {
        let source_len = reader.seek(SeekFrom::End(0))?;
        let location = header::find_header(&mut reader, source_len, options.search_header)
            .inspect_err(|e| {
                if matches!(e, Error::NotAnArchive { .. }) {
                    options.notify(Diagnostics::DEBUG, |o| o.debug("File is not an MPQ archive"));
                }
            })?;

        if let Some(user_data) = &location.user_data {
            options.notify(Diagnostics::USER_DATA_HEADER, |o| o.user_data_header(user_data));
        }
        options.notify(Diagnostics::HEADER, |o| o.header(&location.header));

        let header = location.header;
        let hash_table = HashTable::read(
            &mut reader,
            location.archive_offset + u64::from(header.hash_table_pos),
            header.hash_table_size,
            source_len,
        )?;
        options.notify(Diagnostics::HASH_TABLE, |o| o.hash_table(&hash_table));

        let block_table = BlockTable::read(
            &mut reader,
            location.archive_offset + u64::from(header.block_table_pos),
            header.block_table_size,
            source_len,
        )?;
        options.notify(Diagnostics::BLOCK_TABLE, |o| o.block_table(&block_table));

        log::debug!(
            "Loaded {} hash and {} block entries (archive at 0x{:X})",
            hash_table.size(),
            block_table.size(),
            location.archive_offset
        );

        let mut tables = ArchiveTables {
            archive_offset: location.archive_offset,
            source_len,
            user_data: location.user_data,
            header,
            hash_table,
            block_table,
            file_names: Vec::new(),
        };

        if options.load_listfile {
            options.notify(Diagnostics::DEBUG, |o| o.debug("Extracting list file"));
            tables.file_names = load_listfile(&mut reader, &tables, &options);
        }

        let archive = Self {
            path: None,
            reader: Some(reader),
            reopen: None,
            tables: Arc::new(tables),
            options,
        };

        archive
            .options
            .notify(Diagnostics::FILE_LIST, |o| o.file_list(&archive.list()));

        Ok(archive)
    }

    /// Get the MPQ header
    pub fn header(&self) -> &MpqHeader {
        self.tables.header()
    }

    /// Get the user data header if present
    pub fn user_data(&self) -> Option<&UserDataHeader> {
        self.tables.user_data()
    }

    /// Get the archive offset in the file
    pub fn archive_offset(&self) -> u64 {
        self.tables.archive_offset()
    }

    /// Get the archive path, when opened from a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the hash table
    pub fn hash_table(&self) -> &HashTable {
        self.tables.hash_table()
    }

    /// Get the block table
    pub fn block_table(&self) -> &BlockTable {
        self.tables.block_table()
    }

    /// Shared handle to the decoded tables
    pub fn tables(&self) -> Arc<ArchiveTables> {
        Arc::clone(&self.tables)
    }

    /// Options the archive was opened with
    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    /// Names from `(listfile)`, empty when the archive has none
    pub fn file_names(&self) -> &[String] {
        self.tables.file_names()
    }

    /// Find a file in the archive
    pub fn find_file(&self, filename: &str) -> Result<Option<FileInfo>> {
        self.tables
            .find_file(filename, self.options.locale, self.options.lookup)
    }

    /// List the listfile names that resolve to an entry, with sizes
    pub fn list(&self) -> Vec<FileEntry> {
        self.file_names()
            .iter()
            .filter_map(|name| match self.find_file(name) {
                Ok(Some(info)) => Some(FileEntry {
                    name: name.clone(),
                    size: u64::from(info.entry.file_size),
                    compressed_size: u64::from(info.entry.compressed_size),
                    flags: info.entry.flags,
                }),
                Ok(None) => None,
                Err(e) => {
                    log::debug!("Skipping {name} in listing: {e}");
                    None
                }
            })
            .collect()
    }

    /// Read a file from the archive
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_file_with(name, false)
    }

    /// Read a file, decompressing single-unit files even when the stored size
    /// shows no gain if `force_decompress` is set
    pub fn read_file_with(&mut self, name: &str, force_decompress: bool) -> Result<Vec<u8>> {
        let Self {
            path,
            reader,
            reopen,
            tables,
            options,
        } = self;

        if let Some(reader) = reader.as_mut() {
            return FileExtractor::new(reader, tables, options).extract(name, force_decompress);
        }

        // Closed: open the source for this call only.
        let reopen = reopen.as_ref().ok_or_else(|| Error::UnableToOpen {
            path: path.clone().unwrap_or_default(),
            source: io::Error::new(io::ErrorKind::NotConnected, "archive source is closed"),
        })?;
        let mut scoped = reopen().map_err(|source| Error::UnableToOpen {
            path: path.clone().unwrap_or_default(),
            source,
        })?;
        FileExtractor::new(&mut scoped, tables, options).extract(name, force_decompress)
    }

    /// Extract every listed file, pairing each name with its outcome
    pub fn extract_all(&mut self) -> Vec<(String, Result<Vec<u8>>)> {
        self.options
            .notify(Diagnostics::DEBUG, |o| o.debug("Extracting files"));

        let names = self.tables.file_names.clone();
        names
            .into_iter()
            .map(|name| {
                let result = self.read_file(&name);
                (name, result)
            })
            .collect()
    }

    /// Release the byte source; tables stay available
    pub fn close(&mut self) {
        self.reader = None;
    }

    /// Whether the byte source is currently held open
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }
}

impl<R> fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("open", &self.reader.is_some())
            .field("tables", &self.tables)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

pub(crate) fn open_file(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::UnableToOpen {
            path: path.to_path_buf(),
            source,
        })
}

fn load_listfile<R: Read + Seek>(
    reader: &mut R,
    tables: &ArchiveTables,
    options: &OpenOptions,
) -> Vec<String> {
    match FileExtractor::new(reader, tables, options).extract(LISTFILE_NAME, false) {
        Ok(data) => parse_listfile(&data),
        Err(Error::FileNotFound(_)) => {
            log::debug!("Archive has no (listfile)");
            Vec::new()
        }
        Err(e) => {
            log::warn!("Ignoring unreadable (listfile): {e}");
            Vec::new()
        }
    }
}

/// Information about a file in the archive
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// File name
    pub filename: String,
    /// Index in hash table
    pub hash_index: usize,
    /// Index in block table
    pub block_index: usize,
    /// Absolute file position in the byte source
    pub file_pos: u64,
    /// File locale
    pub locale: u16,
    /// Block table entry
    pub entry: BlockEntry,
}

impl FileInfo {
    /// Check if the file is compressed
    pub fn is_compressed(&self) -> bool {
        self.entry.is_compressed()
    }

    /// Check if the file is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.entry.is_encrypted()
    }

    /// Check if the file is stored as a single unit
    pub fn is_single_unit(&self) -> bool {
        self.entry.is_single_unit()
    }

    /// Check if the file has sector CRCs
    pub fn has_sector_crc(&self) -> bool {
        self.entry.has_sector_crc()
    }
}

/// Information about a file in the archive (for listing)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name
    pub name: String,
    /// Uncompressed size
    pub size: u64,
    /// Compressed size
    pub compressed_size: u64,
    /// File flags
    pub flags: u32,
}

impl FileEntry {
    /// Check if the file is compressed
    pub fn is_compressed(&self) -> bool {
        (self.flags & (BlockEntry::FLAG_IMPLODE | BlockEntry::FLAG_COMPRESS)) != 0
    }

    /// Check if the file is encrypted
    pub fn is_encrypted(&self) -> bool {
        (self.flags & BlockEntry::FLAG_ENCRYPTED) != 0
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        (self.flags & BlockEntry::FLAG_EXISTS) != 0
    }
}
