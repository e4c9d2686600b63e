use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{MetadataCache, TrackMetadata};
use crate::error::{Error, Result};
use crate::sources::{parse_url, MediaExtractor};

/// Cache-aside resolution of URLs into track metadata.
///
/// The read path checks the cache first and only falls back to the extractor
/// on a miss, writing the result back for the next caller. Concurrent
/// resolutions of the same URL are not coalesced: each one runs the extractor
/// independently and the last write wins, which is acceptable because every
/// resolution of a URL produces equivalent metadata.
pub struct TrackResolver {
    cache: MetadataCache,
    extractor: Arc<dyn MediaExtractor>,
}

impl TrackResolver {
    pub fn new(cache: MetadataCache, extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { cache, extractor }
    }

    /// Returns metadata for `url`, from the cache when possible.
    ///
    /// Cached stream URLs are returned without revalidation. A malformed
    /// cache entry is treated as a forced miss: the fresh extraction
    /// overwrites it.
    pub async fn resolve(&self, url: &str) -> Result<TrackMetadata> {
        let url = parse_url(url);

        match self.cache.get(&url).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(Error::CacheDecode { url, .. }) => {
                warn!("⚠️ Malformed cache entry for {url}, re-extracting");
            }
            Err(e) => return Err(e),
        }

        debug!("🔍 Cache miss for {url}, invoking extractor");

        let extracted = self
            .extractor
            .extract(&url)
            .await
            .map_err(Error::Extractor)?
            .ok_or_else(|| Error::TrackNotFound(url.clone()))?;

        let metadata = extracted
            .into_metadata(&url)
            .ok_or_else(|| Error::TrackNotFound(url.clone()))?;

        self.cache.set(&metadata).await?;
        info!("🎶 Resolved {}: {}", url, metadata.title);

        Ok(metadata)
    }

    /// Expands a URL into the individual track URLs it contains.
    ///
    /// A single-track URL yields itself; a playlist yields one URL per
    /// available entry. Nothing at all is [`Error::PlaylistNotFound`].
    pub async fn expand_playlist(&self, url: &str) -> Result<Vec<String>> {
        let url = parse_url(url);

        let urls = self
            .extractor
            .expand(&url)
            .await
            .map_err(Error::Extractor)?
            .filter(|urls| !urls.is_empty())
            .ok_or_else(|| Error::PlaylistNotFound(url.clone()))?;

        Ok(urls)
    }
}
