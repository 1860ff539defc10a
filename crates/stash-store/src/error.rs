use std::io;
use std::path::PathBuf;

/// Errors produced by blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store directory could not be created or accessed.
    #[error("cannot create store directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store name does not name a single directory under the base.
    #[error("invalid store name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// No tokio runtime was available to host the store's dispatcher.
    #[error("no tokio runtime available to run store operations")]
    NoRuntime,

    /// The store configuration could not be read or parsed.
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// The caller supplied an empty payload.
    #[error("no data to store")]
    NoData,

    /// The identifier was empty after trimming.
    #[error("identifier is empty")]
    EmptyIdentifier,

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The worker running the operation went away without reporting a result.
    #[error("store worker stopped before completing the operation")]
    WorkerLost,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
