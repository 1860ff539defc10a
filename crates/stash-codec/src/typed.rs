use serde::de::DeserializeOwned;
use serde::Serialize;
use stash_store::{Pending, Store, StoreOutcome};
use tracing::{debug, warn};

use crate::codec::{Bincode, Codec, Json};

/// Typed load/store helpers for a [`Store`].
///
/// Every method is a thin wrapper over [`Store::load`] and [`Store::store`]:
/// encoding runs lazily inside the store's exclusive section, an encode
/// failure resolves to [`StoreOutcome::NoData`], and a decode failure
/// resolves to `None`.
pub trait TypedStore {
    fn load_with<T, C>(&self, identifier: &str, codec: C) -> Pending<Option<T>>
    where
        T: Send + 'static,
        C: Codec<T>;

    fn store_with<T, C>(
        &self,
        value: T,
        identifier: Option<&str>,
        codec: C,
    ) -> Pending<StoreOutcome>
    where
        T: Send + 'static,
        C: Codec<T>;

    fn load_bytes(&self, identifier: &str) -> Pending<Option<Vec<u8>>>;

    fn store_bytes(&self, bytes: Vec<u8>, identifier: Option<&str>) -> Pending<StoreOutcome>;

    fn load_json<T>(&self, identifier: &str) -> Pending<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        self.load_with(identifier, Json)
    }

    fn store_json<T>(&self, value: T, identifier: Option<&str>) -> Pending<StoreOutcome>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        self.store_with(value, identifier, Json)
    }

    fn load_bincode<T>(&self, identifier: &str) -> Pending<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        self.load_with(identifier, Bincode)
    }

    fn store_bincode<T>(&self, value: T, identifier: Option<&str>) -> Pending<StoreOutcome>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        self.store_with(value, identifier, Bincode)
    }
}

impl TypedStore for Store {
    fn load_with<T, C>(&self, identifier: &str, codec: C) -> Pending<Option<T>>
    where
        T: Send + 'static,
        C: Codec<T>,
    {
        self.load(identifier, move |bytes| match codec.decode(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "stored payload did not decode");
                None
            }
        })
    }

    fn store_with<T, C>(
        &self,
        value: T,
        identifier: Option<&str>,
        codec: C,
    ) -> Pending<StoreOutcome>
    where
        T: Send + 'static,
        C: Codec<T>,
    {
        self.store(
            move || match codec.encode(&value) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(error = %e, "value did not encode; nothing stored");
                    None
                }
            },
            identifier,
        )
    }

    fn load_bytes(&self, identifier: &str) -> Pending<Option<Vec<u8>>> {
        self.load(identifier, Some)
    }

    fn store_bytes(&self, bytes: Vec<u8>, identifier: Option<&str>) -> Pending<StoreOutcome> {
        self.store(move || Some(bytes), identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, CodecResult};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        theme: String,
        font_size: u16,
        recent: Vec<String>,
    }

    fn settings() -> Settings {
        Settings {
            theme: "dark".into(),
            font_size: 14,
            recent: vec!["a.txt".into(), "b.txt".into()],
        }
    }

    /// A codec whose encode always fails.
    struct Broken;

    impl Codec<Settings> for Broken {
        fn encode(&self, _value: &Settings) -> CodecResult<Vec<u8>> {
            Err(CodecError::Json(serde_json::from_str::<u8>("x").unwrap_err()))
        }

        fn decode(&self, bytes: &[u8]) -> CodecResult<Settings> {
            Json.decode(bytes)
        }
    }

    fn open(dir: &tempfile::TempDir) -> Store {
        Store::open_in(dir.path(), "typed").unwrap()
    }

    #[tokio::test]
    async fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        let outcome = store.store_json(settings(), Some("prefs")).await;
        assert!(outcome.is_success());
        assert_eq!(store.load_json::<Settings>("prefs").await, Some(settings()));

        let raw = std::fs::read(store.dir().join("prefs")).unwrap();
        assert!(raw.starts_with(b"{\"theme\":\"dark\""));
    }

    #[tokio::test]
    async fn bincode_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        let mut counts = BTreeMap::new();
        counts.insert("apples".to_string(), 3u64);
        counts.insert("pears".to_string(), 7u64);

        let outcome = store.store_bincode(counts.clone(), None).await;
        let id = outcome.identifier().unwrap().to_string();
        assert_eq!(store.load_bincode::<BTreeMap<String, u64>>(&id).await, Some(counts));
    }

    #[tokio::test]
    async fn bytes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        store.store_bytes(vec![0xde, 0xad, 0xbe, 0xef], Some("raw")).await;
        assert_eq!(store.load_bytes("raw").await, Some(vec![0xde, 0xad, 0xbe, 0xef]));
    }

    #[tokio::test]
    async fn empty_bytes_are_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        let outcome = store.store_bytes(Vec::new(), Some("raw")).await;
        assert!(matches!(outcome, StoreOutcome::NoData));
        assert!(store.load_bytes("raw").await.is_none());
    }

    #[tokio::test]
    async fn decode_mismatch_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        store.store_bytes(b"plain text".to_vec(), Some("k")).await;
        assert!(store.load_json::<Settings>("k").await.is_none());
    }

    #[tokio::test]
    async fn encode_failure_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        let outcome = store.store_with(settings(), Some("k"), Broken).await;
        assert!(matches!(outcome, StoreOutcome::NoData));
        assert!(store.load_with::<Settings, _>("k", Broken).await.is_none());
    }

    #[tokio::test]
    async fn missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        assert!(store.load_json::<Settings>("nothing").await.is_none());
    }
}
