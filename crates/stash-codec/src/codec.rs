use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecResult;

/// Converts typed values to and from stored payload bytes.
pub trait Codec<T>: Send + 'static {
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> CodecResult<T>;
}

/// Human-readable JSON payloads via `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl<T: Serialize + DeserializeOwned> Codec<T> for Json {
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Compact binary payloads via `bincode`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bincode;

impl<T: Serialize + DeserializeOwned> Codec<T> for Bincode {
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}
