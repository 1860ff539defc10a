//! Typed payload helpers for stash stores.
//!
//! The core store only moves opaque bytes. This crate supplies the
//! encode/decode seam: a [`Codec`] turns values into payload bytes and
//! back, and [`TypedStore`] wires codecs into `Store::load` and
//! `Store::store` without adding any scheduling or persistence logic of its
//! own.
//!
//! - [`Json`] -- `serde_json` payloads
//! - [`Bincode`] -- `bincode` payloads
//! - raw bytes via [`TypedStore::load_bytes`] / [`TypedStore::store_bytes`]

pub mod codec;
pub mod error;
pub mod typed;

pub use codec::{Bincode, Codec, Json};
pub use error::{CodecError, CodecResult};
pub use typed::TypedStore;
