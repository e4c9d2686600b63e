//! Extractor boundary: everything that talks to the outside world to turn a
//! URL into playable metadata lives behind [`MediaExtractor`].

pub mod ytdlp;

pub use ytdlp::YtDlpExtractor;

use async_trait::async_trait;
use url::Url;

use crate::cache::TrackMetadata;

/// Raw extraction output, before any field is validated.
///
/// Every field is optional; the extractor reports what it found and the
/// resolver decides whether that is enough to build a [`TrackMetadata`].
#[derive(Debug, Clone, Default)]
pub struct ExtractedTrack {
    pub title: Option<String>,
    /// Canonical page URL, stable across search/playlist variants.
    pub webpage_url: Option<String>,
    /// Direct audio stream URL.
    pub stream_url: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
}

impl ExtractedTrack {
    /// Builds final metadata, or `None` when title or stream URL is missing
    /// (the track is not playable). Falls back to the requested URL when the
    /// extractor reported no canonical one.
    pub fn into_metadata(self, requested_url: &str) -> Option<TrackMetadata> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let audio_url = self.stream_url.filter(|s| !s.is_empty())?;
        let url = self
            .webpage_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| requested_url.to_string());

        Some(TrackMetadata {
            title,
            url,
            audio_url,
            duration: self.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
        })
    }
}

/// External metadata extractor. Expensive, may block on network I/O, and must
/// run off the session-state scheduling path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Full extraction: metadata including a playable stream URL.
    ///
    /// `Ok(None)` means the extractor located nothing for the URL; `Err` is a
    /// process-level failure (binary missing, spawn error).
    async fn extract(&self, url: &str) -> anyhow::Result<Option<ExtractedTrack>>;

    /// Shallow listing: one URL per contained entry, without resolving
    /// streams. Unavailable entries are already skipped. A plain track URL
    /// yields a one-element list; `Ok(None)` means no data at all.
    async fn expand(&self, url: &str) -> anyhow::Result<Option<Vec<String>>>;
}

/// Strips tracking noise from pasted YouTube links so logically identical
/// URLs share one cache key. Only the `v` and `list` query parameters carry
/// identity; everything else (timestamps, share tokens) is dropped. Non-
/// YouTube URLs pass through untouched.
pub fn parse_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    let host = parsed.host_str().unwrap_or_default();
    if !(host.ends_with("youtube.com") || host == "youtu.be") {
        return raw.to_string();
    }

    let keep: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k == "v" || k == "list")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed.set_fragment(None);
    if keep.is_empty() {
        parsed.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &keep {
            serializer.append_pair(key, value);
        }
        let query = serializer.finish();
        parsed.set_query(Some(&query));
    }

    parsed.to_string()
}
