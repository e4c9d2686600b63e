use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the queue/cache core.
///
/// The first four variants map directly to user-visible outcomes ("couldn't
/// find that", benign rejections); the wrapper variants carry backend faults
/// from the cache store or the extractor process.
#[derive(Debug, Error)]
pub enum Error {
    /// The extractor located no playable media, title, or stream URL.
    #[error("no playable track found for {0}")]
    TrackNotFound(String),

    /// The extractor returned no data at all for a playlist listing.
    #[error("no playlist data found for {0}")]
    PlaylistNotFound(String),

    /// The operation needs at least one queued track.
    #[error("the queue is empty")]
    EmptyQueue,

    /// Position 0 holds the active track and may not be moved; moves from
    /// outside the queue bounds are rejected the same way.
    #[error("cannot move the track at position {0}")]
    InvalidMove(usize),

    /// A stored cache value failed to deserialize. Distinct from a miss and
    /// never silently ignored.
    #[error("cached metadata for {url} is malformed")]
    CacheDecode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cache backing store itself failed (connection, protocol, ...).
    #[error("cache backend error")]
    Cache(#[source] anyhow::Error),

    /// The extractor process could not be run at all.
    #[error("extractor error")]
    Extractor(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_name_the_url() {
        let err = Error::TrackNotFound("https://media.example/gone".to_string());
        assert_eq!(
            err.to_string(),
            "no playable track found for https://media.example/gone"
        );
    }

    #[test]
    fn decode_errors_keep_their_source() {
        use std::error::Error as _;

        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = Error::CacheDecode {
            url: "https://media.example/bad".to_string(),
            source,
        };
        assert!(err.source().is_some());
    }
}
