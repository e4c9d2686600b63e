//! # Cache Module
//!
//! Cache-aside storage for resolved track metadata, shared by every session.
//!
//! Extracting metadata for a URL means shelling out to an external extractor,
//! which is slow and rate-limited. The cache maps a canonical source URL to
//! the [`TrackMetadata`] that a previous resolution produced, so repeated
//! requests for the same URL skip the extractor entirely.
//!
//! The backing store is pluggable through [`CacheStore`]:
//!
//! - [`MemoryStore`]: process-local, for single-instance deployments and tests
//! - [`RedisStore`]: a shared Redis service, so multiple bot processes reuse
//!   each other's resolutions
//!
//! Entries have no TTL and are never evicted by this component. Writes are
//! last-write-wins per key; metadata for one logical URL is treated as
//! equivalent across resolutions, so concurrent writers are acceptable.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};

/// Resolved, cacheable description of a playable item.
///
/// Immutable once created. `url` is the canonical source URL and doubles as
/// the cache and de-duplication key; `audio_url` is the ephemeral stream URL
/// derived from it and may expire server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title as reported by the extractor.
    pub title: String,
    /// Canonical source URL (cache key).
    pub url: String,
    /// Direct playable stream URL. Ephemeral.
    pub audio_url: String,
    /// Duration in seconds, 0 when unknown.
    #[serde(default)]
    pub duration: u64,
}

/// Keyed byte store underneath the metadata cache.
///
/// Both operations may suspend; the store can be a remote service. No
/// guarantee stronger than per-key last-write-wins is required.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()>;
}

/// Cache-aside front over a [`CacheStore`], speaking [`TrackMetadata`].
#[derive(Clone)]
pub struct MetadataCache {
    store: Arc<dyn CacheStore>,
}

impl MetadataCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Process-local cache with no external dependencies.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Looks up metadata under `url`.
    ///
    /// A stored value that fails to decode yields [`Error::CacheDecode`], not
    /// `None`; malformed entries are a hard error for the lookup.
    pub async fn get(&self, url: &str) -> Result<Option<TrackMetadata>> {
        let Some(bytes) = self.store.get(url).await.map_err(Error::Cache)? else {
            return Ok(None);
        };

        let metadata = serde_json::from_slice(&bytes).map_err(|source| Error::CacheDecode {
            url: url.to_string(),
            source,
        })?;

        debug!("💾 Cache hit for {url}");
        Ok(Some(metadata))
    }

    /// Stores `metadata` under its canonical URL, overwriting any prior entry.
    pub async fn set(&self, metadata: &TrackMetadata) -> Result<()> {
        let bytes = serde_json::to_vec(metadata).map_err(|e| Error::Cache(e.into()))?;
        self.store
            .set(&metadata.url, bytes)
            .await
            .map_err(Error::Cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TrackMetadata {
        TrackMetadata {
            title: "Never Gonna Give You Up".to_string(),
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            audio_url: "https://cdn.example/stream/dQw4w9WgXcQ".to_string(),
            duration: 212,
        }
    }

    #[tokio::test]
    async fn round_trips_metadata() {
        let cache = MetadataCache::in_memory();
        let track = sample();

        cache.set(&track).await.unwrap();
        let hit = cache.get(&track.url).await.unwrap();

        assert_eq!(hit, Some(track));
    }

    #[tokio::test]
    async fn unknown_key_is_a_miss() {
        let cache = MetadataCache::in_memory();
        assert_eq!(cache.get("https://example.com/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrites_existing_entry() {
        let cache = MetadataCache::in_memory();
        let mut track = sample();

        cache.set(&track).await.unwrap();
        track.audio_url = "https://cdn.example/stream/fresh".to_string();
        cache.set(&track).await.unwrap();

        let hit = cache.get(&track.url).await.unwrap().unwrap();
        assert_eq!(hit.audio_url, "https://cdn.example/stream/fresh");
    }

    #[tokio::test]
    async fn malformed_entry_is_an_error_not_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("https://example.com/bad", b"not json".to_vec())
            .await
            .unwrap();

        let cache = MetadataCache::new(store);
        let err = cache.get("https://example.com/bad").await.unwrap_err();
        assert!(matches!(err, Error::CacheDecode { .. }));
    }

    #[test]
    fn missing_duration_defaults_to_zero() {
        let decoded: TrackMetadata = serde_json::from_str(
            r#"{"title":"t","url":"https://u","audio_url":"https://a"}"#,
        )
        .unwrap();
        assert_eq!(decoded.duration, 0);
    }
}
