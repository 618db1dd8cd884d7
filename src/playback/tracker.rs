use super::PlayerHandle;
use crate::transcript::Chunk;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default playback poll cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which chunk is active, if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveChunkState {
    pub index: Option<usize>,
    pub chunk: Option<Chunk>,
}

impl ActiveChunkState {
    pub fn none() -> Self {
        Self {
            index: None,
            chunk: None,
        }
    }
}

/// Index of the latest-starting chunk at or before `time`.
///
/// Scans from the end so out-of-order chunks resolve to the most recently
/// started one.
pub fn active_index(chunks: &[Chunk], time: Option<f64>) -> Option<usize> {
    let time = time?;
    chunks
        .iter()
        .rposition(|chunk| f64::from(chunk.start_seconds) <= time)
}

/// Turns a stream of playback times into active-chunk change events
#[derive(Debug, Clone)]
pub struct ActiveChunkResolver {
    chunks: Arc<[Chunk]>,
    /// `None` until the first determination has been emitted
    last: Option<Option<usize>>,
}

impl ActiveChunkResolver {
    pub fn new(chunks: Arc<[Chunk]>) -> Self {
        Self { chunks, last: None }
    }

    /// Feed one playback reading; returns a state only when the active index changed.
    /// The first reading after construction or `reset` always produces a state.
    pub fn observe(&mut self, time: Option<f64>) -> Option<ActiveChunkState> {
        let index = active_index(&self.chunks, time);
        if self.last == Some(index) {
            return None;
        }
        self.last = Some(index);

        Some(ActiveChunkState {
            index,
            chunk: index.and_then(|i| self.chunks.get(i).cloned()),
        })
    }

    /// Forget the remembered index
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackerStatus {
    Idle,
    Tracking,
}

struct Poller {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Polls a playback source and emits active-chunk changes on a channel.
///
/// At most one poll task exists per tracker; `start` replaces any running one.
pub struct PlaybackTracker {
    poll_interval: Duration,
    events: mpsc::UnboundedSender<ActiveChunkState>,
    poller: Option<Poller>,
}

impl PlaybackTracker {
    /// Create an idle tracker and the receiving end of its event channel
    pub fn new(poll_interval: Duration) -> (Self, mpsc::UnboundedReceiver<ActiveChunkState>) {
        let (events, rx) = mpsc::unbounded_channel();
        let tracker = Self {
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            events,
            poller: None,
        };
        (tracker, rx)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn status(&self) -> TrackerStatus {
        match &self.poller {
            Some(poller) if !poller.handle.is_finished() => TrackerStatus::Tracking,
            _ => TrackerStatus::Idle,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.status() == TrackerStatus::Tracking
    }

    /// Begin polling `player` against `chunks`. Any running poller is stopped first.
    pub async fn start(&mut self, chunks: Arc<[Chunk]>, player: PlayerHandle) {
        self.stop().await;

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            ActiveChunkResolver::new(chunks),
            player,
            self.poll_interval,
            self.events.clone(),
            cancel_token.clone(),
        ));

        self.poller = Some(Poller {
            handle,
            cancel_token,
        });
        info!("▶️ Playback tracking started ({}ms poll)", self.poll_interval.as_millis());
    }

    /// Cancel the poller and wait for it to finish. No-op when idle.
    pub async fn stop(&mut self) {
        let Some(poller) = self.poller.take() else {
            return;
        };

        poller.cancel_token.cancel();
        if let Err(e) = poller.handle.await {
            warn!("Playback poll task failed to join: {}", e);
        }
        info!("⏹️ Playback tracking stopped");
    }
}

impl Drop for PlaybackTracker {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel_token.cancel();
        }
    }
}

async fn poll_loop(
    mut resolver: ActiveChunkResolver,
    player: PlayerHandle,
    poll_interval: Duration,
    events: mpsc::UnboundedSender<ActiveChunkState>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                debug!("Playback poll loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                if let Some(state) = resolver.observe(player.current_time()) {
                    debug!("Active chunk changed to {:?}", state.index);
                    if events.send(state).is_err() {
                        debug!("Active chunk receiver dropped, ending poll loop");
                        break;
                    }
                }
            }
        }
    }
}
