use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::cache::TrackMetadata;
use crate::config::Config;
use crate::error::Result;
use crate::player::session::Player;
use crate::resolver::TrackResolver;
use crate::sources::YtDlpExtractor;

/// Identifies one independent playback context (a guild/voice channel in the
/// chat-platform domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Owns every session's [`Player`] and supervises their background prefetch
/// tasks.
///
/// Players are created lazily, exactly once per session id. Bulk-add tasks
/// are spawned through a [`TaskTracker`], so completion deregisters them
/// deterministically and shutdown can await the lot; each session gets a
/// child [`CancellationToken`] so teardown of one session cancels only its
/// own prefetch.
pub struct PlayerRegistry {
    resolver: Arc<TrackResolver>,
    players: DashMap<SessionId, Arc<Player>>,
    prefetch_tokens: Arc<DashMap<SessionId, PrefetchSlot>>,
    tasks: TaskTracker,
    shutdown: CancellationToken,
    max_playlist_size: usize,
}

/// One session's prefetch cancellation token, refcounted by the number of
/// in-flight tasks sharing it so the map entry goes away with the last one.
struct PrefetchSlot {
    token: CancellationToken,
    active: usize,
}

impl PlayerRegistry {
    pub fn new(resolver: Arc<TrackResolver>, max_playlist_size: usize) -> Self {
        Self {
            resolver,
            players: DashMap::new(),
            prefetch_tokens: Arc::new(DashMap::new()),
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            max_playlist_size,
        }
    }

    /// Wires up the full stack from configuration: Redis-backed cache when a
    /// URL is configured, in-memory otherwise, with yt-dlp as the extractor.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        use crate::cache::{MetadataCache, RedisStore};

        let cache = match &config.redis_url {
            Some(url) => {
                info!("💾 Using Redis metadata cache at {url}");
                MetadataCache::new(Arc::new(RedisStore::connect(url)?))
            }
            None => {
                info!("💾 Using in-memory metadata cache");
                MetadataCache::in_memory()
            }
        };

        let extractor = Arc::new(YtDlpExtractor::new(config));
        let resolver = Arc::new(TrackResolver::new(cache, extractor));

        Ok(Self::new(resolver, config.max_playlist_size))
    }

    /// Returns the session's player, creating it on first access.
    pub fn get_or_create(&self, id: SessionId) -> Arc<Player> {
        self.players
            .entry(id)
            .or_insert_with(|| {
                debug!("🆕 Creating player state for session {id}");
                Arc::new(Player::new(self.resolver.clone()))
            })
            .clone()
    }

    /// The fast path behind a "play" command: expands `url`, queues the first
    /// entry synchronously so playback can start immediately, and prefetches
    /// the remainder in a tracked background task.
    pub async fn enqueue(&self, id: SessionId, url: &str) -> Result<TrackMetadata> {
        let player = self.get_or_create(id);

        let mut urls = self.resolver.expand_playlist(url).await?;
        if self.max_playlist_size > 0 && urls.len() > self.max_playlist_size {
            warn!(
                "⚠️ Listing truncated from {} to {} entries",
                urls.len(),
                self.max_playlist_size
            );
            urls.truncate(self.max_playlist_size);
        }

        let first = urls.remove(0);
        let track = player.add_track(&first).await?;

        if !urls.is_empty() {
            self.spawn_prefetch(id, player, urls);
        }

        Ok(track)
    }

    /// Spawns a supervised bulk add for `id`.
    pub fn spawn_prefetch(&self, id: SessionId, player: Arc<Player>, urls: Vec<String>) {
        let cancel = self.acquire_prefetch_token(id);
        let slots = Arc::clone(&self.prefetch_tokens);
        let count = urls.len();

        info!("🚀 Prefetching {count} tracks for session {id}");
        self.tasks.spawn(async move {
            let added = player.add_tracks(urls, cancel).await;
            debug!("🏁 Prefetch for session {id} done ({added}/{count})");
            Self::release_prefetch_token(&slots, id);
        });
    }

    /// Tears down one session: cancels its in-flight prefetch and drops its
    /// player state. Already-spawned tasks drain through the tracker.
    pub fn remove(&self, id: SessionId) {
        if let Some((_, slot)) = self.prefetch_tokens.remove(&id) {
            slot.token.cancel();
        }
        if self.players.remove(&id).is_some() {
            info!("🗑️ Dropped player state for session {id}");
        }
    }

    /// Waits for all in-flight prefetch tasks without cancelling them.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Cancels every outstanding prefetch task and awaits their completion.
    pub async fn shutdown(&self) {
        info!("⚠️ Registry shutdown, cancelling background tasks");
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }

    pub fn session_count(&self) -> usize {
        self.players.len()
    }

    fn acquire_prefetch_token(&self, id: SessionId) -> CancellationToken {
        let mut slot = self.prefetch_tokens.entry(id).or_insert_with(|| PrefetchSlot {
            token: self.shutdown.child_token(),
            active: 0,
        });
        slot.active += 1;
        slot.token.clone()
    }

    fn release_prefetch_token(slots: &DashMap<SessionId, PrefetchSlot>, id: SessionId) {
        if let Entry::Occupied(mut occupied) = slots.entry(id) {
            let slot = occupied.get_mut();
            slot.active = slot.active.saturating_sub(1);
            let drained = slot.active == 0;
            if drained {
                occupied.remove();
            }
        }
    }
}
