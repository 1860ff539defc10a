use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::engine;
use crate::error::{StoreError, StoreResult};
use crate::gate::Gate;
use crate::pending::Pending;
use crate::resolver::Resolver;

/// Result of a [`Store::store`] call.
#[derive(Debug)]
pub enum StoreOutcome {
    /// The payload was written under this (trimmed) identifier.
    Success(String),
    /// The producer returned nothing or an empty payload; nothing was written.
    NoData,
    /// The write failed; the entry holds whatever it held before.
    Failed(StoreError),
}

impl StoreOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The identifier written, if the store succeeded.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Success(id) => Some(id),
            _ => None,
        }
    }
}

struct Inner {
    name: String,
    resolver: Resolver,
    config: StoreConfig,
    gate: Gate,
}

/// A directory-backed blob store.
///
/// Maps identifiers to byte payloads, one file per identifier. Loads run
/// concurrently; stores and removals run exclusively. Every operation is
/// queued immediately and returns without blocking; results arrive through
/// the returned [`Pending`].
///
/// Cloning is cheap and yields a handle onto the same store. Two stores must
/// not be opened on the same directory.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Open the store `name` under the default base directory.
    pub fn open(name: &str) -> StoreResult<Self> {
        Self::open_with(name, StoreConfig::default())
    }

    /// Open the store `name` under `base_dir` with otherwise default settings.
    pub fn open_in(base_dir: impl Into<PathBuf>, name: &str) -> StoreResult<Self> {
        Self::open_with(name, StoreConfig::with_base_dir(base_dir))
    }

    /// Open the store `name` with an explicit configuration.
    ///
    /// Creates the store directory if needed. Must be called from within a
    /// tokio runtime, which hosts the store's dispatcher and workers. The
    /// name must be a single path component: not empty, not `.` or `..`,
    /// and free of path separators.
    pub fn open_with(name: &str, config: StoreConfig) -> StoreResult<Self> {
        validate_name(name)?;
        let handle = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let dir = config.store_dir(name);

        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        // Fail now rather than on the first operation if the directory is
        // not listable.
        fs::read_dir(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        info!(store = name, dir = %dir.display(), "store opened");
        Ok(Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                resolver: Resolver::new(dir),
                gate: Gate::new(&handle, name),
                config,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The directory holding this store's entries.
    pub fn dir(&self) -> &Path {
        self.inner.resolver.dir()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Load an entry and convert it with `transform`.
    ///
    /// Resolves to `None` if the entry is absent, if `transform` returns
    /// `None`, or if the read fails (the failure is logged).
    pub fn load<T, F>(&self, identifier: &str, transform: F) -> Pending<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(Vec<u8>) -> Option<T> + Send + 'static,
    {
        let (tx, pending) = Pending::channel(|| None);
        let entry = self.inner.resolver.resolve(identifier);
        let store = self.inner.name.clone();

        self.inner.gate.run_read(move || {
            let value = match engine::read(&entry) {
                Ok(Some(bytes)) => {
                    let value = transform(bytes);
                    if value.is_none() {
                        debug!(store = %store, key = entry.key(), "transform rejected entry");
                    }
                    value
                }
                Ok(None) => {
                    debug!(store = %store, key = entry.key(), "entry not found");
                    None
                }
                Err(e) => {
                    warn!(store = %store, key = entry.key(), error = %e, "load failed");
                    None
                }
            };
            let _ = tx.send(value);
        });
        pending
    }

    /// Store the bytes returned by `producer` under `identifier`, or under a
    /// freshly generated identifier when `None`.
    ///
    /// `producer` runs inside the exclusive section, so payloads can be
    /// built lazily once the write is actually admitted.
    pub fn store<P>(&self, producer: P, identifier: Option<&str>) -> Pending<StoreOutcome>
    where
        P: FnOnce() -> Option<Vec<u8>> + Send + 'static,
    {
        let (tx, pending) = Pending::channel(|| StoreOutcome::Failed(StoreError::WorkerLost));
        let identifier = match identifier {
            Some(id) => id.to_string(),
            None => Uuid::now_v7().to_string(),
        };
        let entry = self.inner.resolver.resolve(&identifier);
        let store = self.inner.name.clone();
        let sync = self.inner.config.sync_mode;
        let prefix = self.inner.config.temp_prefix.clone();

        self.inner.gate.run_exclusive(move || {
            let outcome = match producer() {
                Some(bytes) if !bytes.is_empty() => {
                    match engine::write_atomic(&entry, &bytes, sync, &prefix) {
                        Ok(()) => StoreOutcome::Success(entry.key().to_string()),
                        Err(StoreError::NoData) => StoreOutcome::NoData,
                        Err(e) => {
                            warn!(store = %store, key = entry.key(), error = %e, "store failed");
                            StoreOutcome::Failed(e)
                        }
                    }
                }
                _ => {
                    debug!(store = %store, key = entry.key(), "producer returned no data");
                    StoreOutcome::NoData
                }
            };
            let _ = tx.send(outcome);
        });
        pending
    }

    /// Remove an entry. Fire-and-forget: failures are logged, and removing
    /// an absent entry is not a failure.
    pub fn remove(&self, identifier: &str) {
        let entry = self.inner.resolver.resolve(identifier);
        let store = self.inner.name.clone();

        self.inner.gate.run_exclusive(move || {
            if let Err(e) = engine::delete(&entry) {
                warn!(store = %store, key = entry.key(), error = %e, "remove failed");
            }
        });
    }

    /// Remove every entry in the store. Fire-and-forget: entries that cannot
    /// be removed are logged and skipped.
    pub fn remove_all(&self) {
        let dir = self.inner.resolver.dir().to_path_buf();
        let store = self.inner.name.clone();

        self.inner.gate.run_exclusive(move || match engine::delete_all(&dir) {
            Ok(report) if report.is_clean() => {
                info!(store = %store, removed = report.removed, "store purged");
            }
            Ok(report) => {
                for failure in &report.failures {
                    warn!(
                        store = %store,
                        path = %failure.path.display(),
                        error = %failure.error,
                        "entry survived purge"
                    );
                }
                warn!(
                    store = %store,
                    removed = report.removed,
                    failed = report.failures.len(),
                    "store purge incomplete"
                );
            }
            Err(e) => warn!(store = %store, error = %e, "store purge failed"),
        });
    }
}

/// Reject names that would put the store directory anywhere other than one
/// fresh component below the base directory.
fn validate_name(name: &str) -> StoreResult<()> {
    let invalid = |reason| {
        Err(StoreError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return invalid("must not be empty");
    }
    if trimmed == "." || trimmed == ".." {
        return invalid("must not be '.' or '..'");
    }
    if name.contains(|c: char| c == '/' || c == '\\') {
        return invalid("must not contain path separators");
    }
    Ok(())
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("dir", &self.dir())
            .finish()
    }
}
