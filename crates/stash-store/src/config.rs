use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Flush strategy for entry writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` the temporary file before the rename and the directory after it.
    #[default]
    Always,
    /// Rely on OS page-cache buffering. The rename is still atomic, but a
    /// crash may lose the most recent writes.
    OsDefault,
}

/// Configuration for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory under which each store gets its own subdirectory.
    pub base_dir: PathBuf,
    /// Flush strategy for writes.
    pub sync_mode: SyncMode,
    /// File name prefix for in-flight temporary files.
    pub temp_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir().join("stash"),
            sync_mode: SyncMode::default(),
            temp_prefix: ".stash-tmp-".into(),
        }
    }
}

impl StoreConfig {
    /// A default configuration rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Directory for the store called `name`.
    pub fn store_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.sync_mode, SyncMode::Always);
        assert!(c.base_dir.ends_with("stash"));
        assert!(c.temp_prefix.starts_with('.'));
    }

    #[test]
    fn parse_full_toml() {
        let c = StoreConfig::from_toml_str(
            r#"
            base_dir = "/var/lib/app"
            sync_mode = "os_default"
            temp_prefix = ".partial-"
            "#,
        )
        .unwrap();
        assert_eq!(c.base_dir, PathBuf::from("/var/lib/app"));
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
        assert_eq!(c.temp_prefix, ".partial-");
    }

    #[test]
    fn missing_keys_take_defaults() {
        let c = StoreConfig::from_toml_str("base_dir = \"/srv\"").unwrap();
        assert_eq!(c.base_dir, PathBuf::from("/srv"));
        assert_eq!(c.sync_mode, SyncMode::Always);
        assert_eq!(c.temp_prefix, StoreConfig::default().temp_prefix);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = StoreConfig::from_toml_str("sync_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stash.toml");
        fs::write(&path, "sync_mode = \"always\"\n").unwrap();
        let c = StoreConfig::from_file(&path).unwrap();
        assert_eq!(c.sync_mode, SyncMode::Always);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn store_dir_joins_name() {
        let c = StoreConfig::with_base_dir("/data");
        assert_eq!(c.store_dir("thumbs"), PathBuf::from("/data/thumbs"));
    }
}
