//! Identifier to path resolution.
//!
//! Identifiers are trimmed of surrounding whitespace (including newlines) and
//! joined onto the store directory as a single file name. Characters are not
//! otherwise checked: callers must not pass identifiers containing path
//! separators or `..` components.

use std::path::{Path, PathBuf};

/// A resolved entry location inside a store directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPath {
    key: String,
    path: PathBuf,
}

impl EntryPath {
    /// The trimmed identifier this path was resolved from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Full filesystem path of the entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the identifier trimmed down to nothing.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Maps identifiers onto files in one store directory.
#[derive(Clone, Debug)]
pub struct Resolver {
    dir: PathBuf,
}

impl Resolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory entries are resolved into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve an identifier to its entry path.
    ///
    /// Never fails. An identifier that is empty after trimming yields an
    /// [`EntryPath`] whose key is empty; the I/O engine rejects it.
    pub fn resolve(&self, identifier: &str) -> EntryPath {
        let key = normalize(identifier);
        let path = if key.is_empty() {
            self.dir.clone()
        } else {
            self.dir.join(key)
        };
        EntryPath {
            key: key.to_string(),
            path,
        }
    }
}

/// Trim leading and trailing whitespace and newlines from an identifier.
pub fn normalize(identifier: &str) -> &str {
    identifier.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolves_into_store_dir() {
        let resolver = Resolver::new("/data/avatars");
        let entry = resolver.resolve("user-1");
        assert_eq!(entry.key(), "user-1");
        assert_eq!(entry.path(), Path::new("/data/avatars/user-1"));
    }

    #[test]
    fn whitespace_and_newlines_are_trimmed() {
        let resolver = Resolver::new("/data");
        assert_eq!(resolver.resolve(" foo \n"), resolver.resolve("foo"));
        assert_eq!(resolver.resolve("\tfoo\r\n").key(), "foo");
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let resolver = Resolver::new("/data");
        assert_eq!(resolver.resolve(" a b ").key(), "a b");
    }

    #[test]
    fn empty_identifier_resolves_without_failing() {
        let resolver = Resolver::new("/data");
        let entry = resolver.resolve("  \n ");
        assert!(entry.is_empty());
        assert_eq!(entry.key(), "");
    }

    proptest! {
        #[test]
        fn padding_never_changes_the_entry(
            id in "[a-zA-Z0-9_.-]{1,24}",
            left in "[ \t\n\r]{0,4}",
            right in "[ \t\n\r]{0,4}",
        ) {
            let resolver = Resolver::new("/store");
            let padded = format!("{left}{id}{right}");
            prop_assert_eq!(resolver.resolve(&padded), resolver.resolve(&id));
        }

        #[test]
        fn resolution_is_deterministic(id in "\\PC{0,32}") {
            let resolver = Resolver::new("/store");
            prop_assert_eq!(resolver.resolve(&id), resolver.resolve(&id));
        }
    }
}
