//! Durable, byte-level entry I/O.
//!
//! Every function here is synchronous and assumes the caller holds the
//! appropriate gate access: shared for [`read`], exclusive for everything
//! else.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::SyncMode;
use crate::error::{StoreError, StoreResult};
use crate::resolver::EntryPath;

/// One entry that `delete_all` could not remove.
#[derive(Debug)]
pub struct PurgeFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Outcome of [`delete_all`].
#[derive(Debug, Default)]
pub struct PurgeReport {
    /// Number of entries removed.
    pub removed: usize,
    /// Entries that failed to be removed; removal continued past each.
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    /// Returns `true` if every entry was removed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read an entry's bytes. Returns `Ok(None)` if the entry does not exist.
pub fn read(entry: &EntryPath) -> StoreResult<Option<Vec<u8>>> {
    if entry.is_empty() {
        return Err(StoreError::EmptyIdentifier);
    }
    match fs::read(entry.path()) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace an entry's contents atomically.
///
/// The payload goes to a temporary file in the entry's directory which is
/// then renamed over the destination, so readers see either the old or the
/// new bytes in full. An empty payload is rejected before touching disk.
pub fn write_atomic(
    entry: &EntryPath,
    bytes: &[u8],
    sync: SyncMode,
    temp_prefix: &str,
) -> StoreResult<()> {
    if entry.is_empty() {
        return Err(StoreError::EmptyIdentifier);
    }
    if bytes.is_empty() {
        return Err(StoreError::NoData);
    }
    let dir = entry.path().parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "entry path has no parent")
    })?;

    // The temp file is removed on drop if anything below fails.
    let mut builder = tempfile::Builder::new();
    builder.prefix(temp_prefix);
    // Entries get the same mode as a plain `fs::write` instead of tempfile's 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    if sync == SyncMode::Always {
        tmp.as_file().sync_all()?;
    }
    tmp.persist(entry.path()).map_err(|e| StoreError::Io(e.error))?;
    if sync == SyncMode::Always {
        sync_dir(dir)?;
    }

    debug!(key = entry.key(), len = bytes.len(), "entry written");
    Ok(())
}

/// Remove an entry. Returns `true` if it existed; a missing entry is not an
/// error.
pub fn delete(entry: &EntryPath) -> StoreResult<bool> {
    if entry.is_empty() {
        return Err(StoreError::EmptyIdentifier);
    }
    match fs::remove_file(entry.path()) {
        Ok(()) => {
            debug!(key = entry.key(), "entry removed");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Remove every entry in `dir`, continuing past individual failures.
///
/// Only a failure to list the directory itself is returned as an error;
/// per-entry failures are logged and collected in the report. Subdirectories
/// are left in place and reported as failures.
pub fn delete_all(dir: &Path) -> StoreResult<PurgeReport> {
    let mut report = PurgeReport::default();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(e.into()),
    };

    for item in entries {
        let item = match item {
            Ok(item) => item,
            Err(error) => {
                warn!(dir = %dir.display(), error = %error, "failed to read directory entry");
                report.failures.push(PurgeFailure {
                    path: dir.to_path_buf(),
                    error,
                });
                continue;
            }
        };
        let path = item.path();
        // Stores never create subdirectories; one here is not ours to delete.
        let result = match item.file_type() {
            Ok(ft) if ft.is_dir() => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to purge a subdirectory",
            )),
            Ok(_) => fs::remove_file(&path),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => report.removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                warn!(path = %path.display(), error = %error, "failed to remove entry");
                report.failures.push(PurgeFailure { path, error });
            }
        }
    }

    debug!(
        dir = %dir.display(),
        removed = report.removed,
        failed = report.failures.len(),
        "purge complete"
    );
    Ok(report)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
