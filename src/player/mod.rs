//! Per-session playback state: the track queue itself, the async player
//! wrapper around it, and the registry that owns one player per session.

pub mod queue;
pub mod registry;
pub mod session;

pub use queue::TrackQueue;
pub use registry::{PlayerRegistry, SessionId};
pub use session::Player;
