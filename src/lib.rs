//! # jukebox
//!
//! The queue/cache core of a music bot: per-session ordered playback queues
//! with shuffle/reorder semantics, and a shared cache-aside metadata layer
//! that keeps expensive extractor calls from repeating.
//!
//! The crate deliberately stops at the domain boundary. Voice transport,
//! message rendering, and command parsing are external collaborators; they
//! consume [`PlayerRegistry`] (one [`Player`] per session) and drive playback
//! through [`Player::next`] / [`Player::previous`], which hand back
//! [`TrackMetadata`] with a playable stream URL.
//!
//! ## Typical flow
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jukebox::{Config, PlayerRegistry, SessionId};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let registry = Arc::new(PlayerRegistry::from_config(&config)?);
//!
//! // A "play <url>" command: the first track is resolved synchronously so
//! // playback starts right away; the rest of the playlist fills in behind.
//! let first = registry.enqueue(SessionId(42), "https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//! println!("now playing: {}", first.title);
//!
//! let player = registry.get_or_create(SessionId(42));
//! while let Some(track) = player.next() {
//!     // hand track.audio_url to the playback driver
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod player;
pub mod resolver;
pub mod sources;

pub use cache::{CacheStore, MemoryStore, MetadataCache, RedisStore, TrackMetadata};
pub use config::Config;
pub use error::{Error, Result};
pub use player::{Player, PlayerRegistry, SessionId, TrackQueue};
pub use resolver::TrackResolver;
pub use sources::{MediaExtractor, YtDlpExtractor};
