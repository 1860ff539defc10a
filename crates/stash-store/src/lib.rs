//! Concurrent, file-backed blob storage.
//!
//! A [`Store`] owns one directory and maps string identifiers to opaque byte
//! payloads, one regular file per identifier. All operations are scheduled
//! asynchronously and never block the caller.
//!
//! # Layers
//!
//! - [`resolver`] -- trims identifiers and maps them to entry paths
//! - [`gate`] -- readers-writer admission in submission order
//! - [`engine`] -- read, atomic write, delete, and purge on the filesystem
//! - [`Store`] -- the async façade tying the three together
//!
//! # Guarantees
//!
//! 1. Loads run concurrently with each other.
//! 2. Stores and removals run with nothing else in flight.
//! 3. Operations are admitted in the order they were submitted.
//! 4. Writes go through a temporary file and an atomic rename, so a load
//!    sees either the previous or the new payload in full.
//! 5. Every `load`/`store` resolves its [`Pending`] exactly once; errors
//!    never cross the async boundary as panics.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> stash_store::StoreResult<()> {
//! use stash_store::Store;
//!
//! let store = Store::open_in("/var/lib/app", "thumbnails")?;
//! let outcome = store.store(|| Some(b"png bytes".to_vec()), Some("user-42")).await;
//! assert!(outcome.is_success());
//!
//! let bytes = store.load("user-42", Some).await;
//! assert_eq!(bytes.as_deref(), Some(&b"png bytes"[..]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod pending;
pub mod resolver;
pub mod store;

pub use config::{StoreConfig, SyncMode};
pub use engine::{PurgeFailure, PurgeReport};
pub use error::{StoreError, StoreResult};
pub use gate::Gate;
pub use pending::Pending;
pub use resolver::{EntryPath, Resolver};
pub use store::{Store, StoreOutcome};
