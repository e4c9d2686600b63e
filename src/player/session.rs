use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::TrackMetadata;
use crate::error::Result;
use crate::player::queue::TrackQueue;
use crate::resolver::TrackResolver;

/// One session's player: the track queue plus the resolution path into it.
///
/// Queue mutations take a short write lock, never held across an await;
/// resolution (the slow part) always happens first, outside the lock. That
/// lets a background bulk add keep appending while the user navigates,
/// shuffles, or reorders the same queue.
pub struct Player {
    resolver: Arc<TrackResolver>,
    queue: RwLock<TrackQueue>,
}

impl Player {
    pub fn new(resolver: Arc<TrackResolver>) -> Self {
        Self {
            resolver,
            queue: RwLock::new(TrackQueue::new()),
        }
    }

    /// Resolves `url` (possibly suspending on a cache miss) and appends the
    /// track. The cursor is untouched.
    pub async fn add_track(&self, url: &str) -> Result<TrackMetadata> {
        let track = self.resolver.resolve(url).await?;
        self.queue.write().push(track.clone());
        Ok(track)
    }

    /// Resolves and appends `urls` sequentially, preserving input order.
    ///
    /// Intended to run as a supervised background task for bulk additions. A
    /// failing URL is logged and skipped; the rest of the batch continues.
    /// Cancellation is observed between tracks, so an aborted batch leaves
    /// the queue valid, just incomplete. Returns the number of tracks added.
    pub async fn add_tracks(&self, urls: Vec<String>, cancel: CancellationToken) -> usize {
        let mut added = 0;

        for url in urls {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("🛑 Bulk add cancelled after {added} tracks");
                    break;
                }
                resolved = self.add_track(&url) => match resolved {
                    Ok(track) => {
                        added += 1;
                        debug!("➕ Prefetched: {}", track.title);
                    }
                    Err(e) => warn!("⚠️ Skipping {url}: {e}"),
                },
            }
        }

        if added > 0 {
            info!("🎵 Bulk add finished, {added} tracks queued");
        }
        added
    }

    /// Advances to the next track; `None` means the queue is exhausted.
    pub fn next(&self) -> Option<TrackMetadata> {
        self.queue.write().advance()
    }

    /// Steps back to the previous track.
    pub fn previous(&self) -> Option<TrackMetadata> {
        self.queue.write().rewind()
    }

    /// Jumps to `index`, wrapping modulo the queue length.
    pub fn skip_to(&self, index: usize) -> Result<TrackMetadata> {
        self.queue.write().skip_to(index)
    }

    /// Relocates a queued track. Position 0 is off-limits.
    pub fn move_track(&self, from: usize, to: usize) -> Result<()> {
        self.queue.write().move_track(from, to)
    }

    /// Flips shuffle mode, returning the new state.
    pub fn toggle_shuffle(&self) -> bool {
        self.queue.write().toggle_shuffle()
    }

    pub fn current_track(&self) -> Option<TrackMetadata> {
        self.queue.read().current_track()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue.read().current_index()
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.read().is_shuffled()
    }

    pub fn len(&self) -> usize {
        self.queue.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.read().is_empty()
    }

    /// Snapshot of the playback order, for queue listings.
    pub fn tracks(&self) -> Vec<TrackMetadata> {
        self.queue.read().tracks()
    }

    /// Snapshot of the canonical insertion order.
    pub fn playlist(&self) -> Vec<TrackMetadata> {
        self.queue.read().playlist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MetadataCache;
    use crate::sources::{ExtractedTrack, MockMediaExtractor};
    use pretty_assertions::assert_eq;

    fn extraction_for(url: &str) -> ExtractedTrack {
        ExtractedTrack {
            title: Some(format!("Track {url}")),
            webpage_url: Some(url.to_string()),
            stream_url: Some(format!("{url}/stream")),
            duration: Some(120.0),
        }
    }

    fn player_with(mock: MockMediaExtractor) -> Player {
        let resolver = TrackResolver::new(MetadataCache::in_memory(), Arc::new(mock));
        Player::new(Arc::new(resolver))
    }

    fn resolving_player() -> Player {
        let mut mock = MockMediaExtractor::new();
        mock.expect_extract()
            .returning(|url| Ok(Some(extraction_for(url))));
        player_with(mock)
    }

    #[tokio::test]
    async fn add_track_appends_to_both_orders() {
        let player = resolving_player();

        player.add_track("https://media.example/a").await.unwrap();
        player.add_track("https://media.example/b").await.unwrap();

        assert_eq!(player.len(), 2);
        assert_eq!(player.playlist().len(), 2);
        assert_eq!(player.current_index(), None);
    }

    #[tokio::test]
    async fn bulk_add_preserves_order() {
        let player = resolving_player();

        let urls: Vec<String> = (0..4)
            .map(|i| format!("https://media.example/{i}"))
            .collect();
        let added = player.add_tracks(urls, CancellationToken::new()).await;

        assert_eq!(added, 4);
        let titles: Vec<String> = player.tracks().iter().map(|t| t.title.clone()).collect();
        assert_eq!(
            titles,
            vec![
                "Track https://media.example/0",
                "Track https://media.example/1",
                "Track https://media.example/2",
                "Track https://media.example/3",
            ]
        );
    }

    #[tokio::test]
    async fn bulk_add_isolates_per_track_failures() {
        let mut mock = MockMediaExtractor::new();
        mock.expect_extract().returning(|url| {
            if url.contains("broken") {
                Ok(None)
            } else {
                Ok(Some(extraction_for(url)))
            }
        });
        let player = player_with(mock);

        let urls = vec![
            "https://media.example/a".to_string(),
            "https://media.example/broken".to_string(),
            "https://media.example/c".to_string(),
        ];
        let added = player.add_tracks(urls, CancellationToken::new()).await;

        assert_eq!(added, 2);
        assert_eq!(player.len(), 2);
    }

    #[tokio::test]
    async fn cancelled_bulk_add_leaves_queue_consistent() {
        let player = resolving_player();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let urls = vec![
            "https://media.example/a".to_string(),
            "https://media.example/b".to_string(),
        ];
        let added = player.add_tracks(urls, cancel).await;

        assert_eq!(added, 0);
        assert!(player.is_empty());
        assert_eq!(player.tracks().len(), player.playlist().len());
    }

    #[tokio::test]
    async fn navigation_interleaves_with_additions() {
        let player = resolving_player();

        player.add_track("https://media.example/a").await.unwrap();
        assert_eq!(player.next().unwrap().title, "Track https://media.example/a");
        assert_eq!(player.next(), None);

        // A later append un-exhausts the queue at the same cursor.
        player.add_track("https://media.example/b").await.unwrap();
        assert_eq!(player.next().unwrap().title, "Track https://media.example/b");
    }
}
