/// Playback source abstraction and active-chunk tracking
///
/// The video element is never read from a global. Callers hand a
/// `PlayerHandle` to the tracker and the sync controller; the handle may be
/// empty when the host page has no player, in which case every call is a
/// harmless no-op.

pub mod simulated;
pub mod tracker;

pub use simulated::SimulatedPlayer;
pub use tracker::{
    active_index, ActiveChunkResolver, ActiveChunkState, PlaybackTracker, TrackerStatus,
    DEFAULT_POLL_INTERVAL,
};

use crate::error::Result;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A video player the engine can read and steer
pub trait PlaybackSource: Send + Sync {
    /// Current playback position in seconds
    fn current_time(&self) -> Result<f64>;

    /// Move the playback position
    fn seek_to(&self, seconds: f64);

    /// Resume playback
    fn play(&self);
}

/// Shared, swappable slot holding the current playback source (if any)
#[derive(Clone, Default)]
pub struct PlayerHandle {
    inner: Arc<RwLock<Option<Arc<dyn PlaybackSource>>>>,
}

impl PlayerHandle {
    /// Handle with no player bound
    pub fn empty() -> Self {
        Self::default()
    }

    /// Handle bound to `source`
    pub fn new(source: Arc<dyn PlaybackSource>) -> Self {
        let handle = Self::default();
        handle.attach(source);
        handle
    }

    /// Bind a player, replacing any previous one
    pub fn attach(&self, source: Arc<dyn PlaybackSource>) {
        let mut slot = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(source);
    }

    /// Drop the bound player, e.g. when the video element disappears
    pub fn detach(&self) {
        let mut slot = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = None;
    }

    pub fn is_attached(&self) -> bool {
        self.source().is_some()
    }

    fn source(&self) -> Option<Arc<dyn PlaybackSource>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current position, or `None` when there is no player or the read failed
    pub fn current_time(&self) -> Option<f64> {
        let source = self.source()?;
        match source.current_time() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Some(seconds),
            Ok(seconds) => {
                debug!("Ignoring invalid playback time {}", seconds);
                None
            }
            Err(e) => {
                debug!("Playback time unavailable: {}", e);
                None
            }
        }
    }

    /// Seek the bound player; no-op without one
    pub fn seek_to(&self, seconds: f64) {
        if let Some(source) = self.source() {
            source.seek_to(seconds);
        }
    }

    /// Resume the bound player; no-op without one
    pub fn play(&self) {
        if let Some(source) = self.source() {
            source.play();
        }
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}
