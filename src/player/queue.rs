use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::cache::TrackMetadata;
use crate::error::{Error, Result};

/// Ordered playback state for one session.
///
/// `playlist` holds tracks in canonical insertion order; `queue` holds them in
/// playback order. The two are identical until shuffle is enabled, and always
/// contain the same tracks. The cursor indexes into `queue`, `None` meaning
/// nothing has started yet.
///
/// While shuffled with a track playing, that track is anchored at queue
/// position 0: toggling shuffle never relocates or interrupts what is
/// currently audible.
#[derive(Debug, Default)]
pub struct TrackQueue {
    playlist: Vec<TrackMetadata>,
    queue: Vec<TrackMetadata>,
    current: Option<usize>,
    shuffled: bool,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolved track to both orders. The cursor is untouched.
    pub fn push(&mut self, track: TrackMetadata) {
        debug!("➕ Queued: {}", track.title);
        self.playlist.push(track.clone());
        self.queue.push(track);
    }

    /// Advances the cursor and returns the new current track, or `None` when
    /// the queue is exhausted (the cursor stays put — this is the terminal
    /// "stop playback" signal).
    pub fn advance(&mut self) -> Option<TrackMetadata> {
        let next = match self.current {
            None => 0,
            Some(i) => i + 1,
        };

        if next < self.queue.len() {
            self.current = Some(next);
            Some(self.queue[next].clone())
        } else {
            None
        }
    }

    /// Moves the cursor back one position, or `None` when already at the
    /// start (or nothing has played).
    pub fn rewind(&mut self) -> Option<TrackMetadata> {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                Some(self.queue[i - 1].clone())
            }
            _ => None,
        }
    }

    /// Jumps the cursor to `index`, wrapping modulo the queue length.
    pub fn skip_to(&mut self, index: usize) -> Result<TrackMetadata> {
        if self.queue.is_empty() {
            return Err(Error::EmptyQueue);
        }

        let index = index % self.queue.len();
        self.current = Some(index);
        Ok(self.queue[index].clone())
    }

    /// Relocates the track at `from` to position `to` in playback order.
    ///
    /// Position 0 is reserved for the active slot: it may not be moved
    /// (`from == 0` is rejected) and is never a destination (`to == 0` is
    /// coerced to 1). The cursor refers to a queue position, not a track
    /// identity, and is deliberately left alone across a move.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let to = if to == 0 { 1 } else { to };

        if from == 0 || from >= self.queue.len() {
            return Err(Error::InvalidMove(from));
        }

        let track = self.queue.remove(from);
        let to = to.min(self.queue.len());
        self.queue.insert(to, track);

        debug!("📍 Moved track from position {from} to {to}");
        Ok(())
    }

    /// Flips shuffle mode and returns the new state.
    ///
    /// Enabling keeps the current track (if any) at position 0 and permutes
    /// the rest. Disabling restores canonical playlist order and re-anchors
    /// the cursor to the current track's position in it.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffled = !self.shuffled;

        if self.shuffled {
            let mut rng = rand::thread_rng();
            match self.current {
                Some(i) => {
                    let anchor = self.queue.remove(i);
                    self.queue.shuffle(&mut rng);
                    self.queue.insert(0, anchor);
                    self.current = Some(0);
                }
                None => self.queue.shuffle(&mut rng),
            }
            info!("🔀 Shuffle enabled");
        } else {
            let playing = self.current.map(|i| self.queue[i].clone());
            self.queue = self.playlist.clone();
            self.current =
                playing.and_then(|track| self.queue.iter().position(|t| *t == track));
            info!("➡️ Shuffle disabled, playlist order restored");
        }

        self.shuffled
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<TrackMetadata> {
        self.current.map(|i| self.queue[i].clone())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Snapshot of the playback order, for queue listings.
    pub fn tracks(&self) -> Vec<TrackMetadata> {
        self.queue.clone()
    }

    /// Snapshot of the canonical insertion order.
    pub fn playlist(&self) -> Vec<TrackMetadata> {
        self.playlist.clone()
    }
}
