//! Content-addressed filesystem store for cass.
//!
//! This crate provides:
//! - Single-pass hash-while-write ingestion of byte streams
//! - Atomic publish of objects under digest-derived names
//! - A staged copy fallback when the temp and store directories differ

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ContentStore;

use bytes::Bytes;
use cass_core::config::StoreConfig;
use futures::stream::BoxStream;

/// Single-pass source of content chunks, from an upload or a remote response.
///
/// Whoever holds the stream owns it; `ContentStore::store` takes it by value
/// and drops it on every exit path.
pub type ByteStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Create a content store from configuration.
pub async fn from_config(config: &StoreConfig) -> StoreResult<ContentStore> {
    ContentStore::new(&config.file_store, &config.temp_dir).await
}
