/// Binds active-chunk events to view effects: highlight, auto-scroll, seek

pub mod preferences;

pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};

use crate::error::Result;
use crate::playback::{ActiveChunkState, PlayerHandle};
use crate::transcript::Chunk;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Preference key for the auto-scroll toggle
pub const AUTO_SCROLL_KEY: &str = "auto_scroll_enabled";

/// What the transcript panel is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptState<'a> {
    Loading,
    Empty,
    Chunks(&'a [Chunk]),
    Closed,
}

/// Rendering surface for a transcript panel
pub trait ChunkView: Send + Sync {
    /// Replace the panel contents
    fn render(&self, state: &TranscriptState<'_>);

    /// Toggle the active styling of one chunk
    fn set_highlighted(&self, index: usize, highlighted: bool);

    /// Scroll the chunk to the vertical center of its container
    fn scroll_to_center(&self, index: usize);
}

pub struct SyncController {
    view: Arc<dyn ChunkView>,
    preferences: Arc<dyn PreferenceStore>,
    player: PlayerHandle,
    highlighted: Mutex<Option<usize>>,
    auto_scroll: AtomicBool,
}

impl SyncController {
    /// Create a controller; auto-scroll is read from `preferences`, enabled when unset
    pub fn new(
        view: Arc<dyn ChunkView>,
        preferences: Arc<dyn PreferenceStore>,
        player: PlayerHandle,
    ) -> Self {
        let auto_scroll = preferences.get_bool(AUTO_SCROLL_KEY).unwrap_or(true);
        Self {
            view,
            preferences,
            player,
            highlighted: Mutex::new(None),
            auto_scroll: AtomicBool::new(auto_scroll),
        }
    }

    /// Use `default` instead of `true` when no preference has been stored yet
    pub fn with_auto_scroll_default(self, default: bool) -> Self {
        let enabled = self.preferences.get_bool(AUTO_SCROLL_KEY).unwrap_or(default);
        self.auto_scroll.store(enabled, Ordering::Relaxed);
        self
    }

    pub fn view(&self) -> &Arc<dyn ChunkView> {
        &self.view
    }

    pub fn player(&self) -> &PlayerHandle {
        &self.player
    }

    pub fn auto_scroll_enabled(&self) -> bool {
        self.auto_scroll.load(Ordering::Relaxed)
    }

    /// Flip auto-scroll and persist the new value
    pub fn toggle_auto_scroll(&self) -> Result<bool> {
        let enabled = !self.auto_scroll.fetch_xor(true, Ordering::Relaxed);
        info!("Auto-scroll {}", if enabled { "enabled" } else { "disabled" });
        self.preferences.set_bool(AUTO_SCROLL_KEY, enabled)?;
        Ok(enabled)
    }

    pub fn highlighted(&self) -> Option<usize> {
        *self.lock_highlighted()
    }

    fn lock_highlighted(&self) -> std::sync::MutexGuard<'_, Option<usize>> {
        match self.highlighted.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Apply one active-chunk change to the view
    pub fn handle(&self, state: &ActiveChunkState) {
        let mut highlighted = self.lock_highlighted();

        if let Some(previous) = highlighted.take() {
            self.view.set_highlighted(previous, false);
        }

        let Some(index) = state.index else {
            debug!("No active chunk");
            return;
        };

        self.view.set_highlighted(index, true);
        *highlighted = Some(index);

        if self.auto_scroll_enabled() {
            self.view.scroll_to_center(index);
        }
    }

    /// Forget the highlighted chunk after the view was re-rendered
    pub fn reset(&self) {
        *self.lock_highlighted() = None;
    }

    /// Move playback to the start of `chunk` and resume.
    /// The tracker notices the new position on its next tick.
    pub fn seek(&self, chunk: &Chunk) {
        info!("⏩ Seeking to {}", chunk.label());
        self.player.seek_to(f64::from(chunk.start_seconds));
        self.player.play();
    }

    /// Consume tracker events until the channel closes
    pub async fn run(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<ActiveChunkState>) {
        while let Some(state) = events.recv().await {
            self.handle(&state);
        }
        debug!("Active chunk channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackSource;

    #[derive(Default)]
    struct RecordingView {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingView {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChunkView for RecordingView {
        fn render(&self, state: &TranscriptState<'_>) {
            self.calls.lock().unwrap().push(format!("render {:?}", state));
        }
        fn set_highlighted(&self, index: usize, highlighted: bool) {
            let op = if highlighted { "mark" } else { "clear" };
            self.calls.lock().unwrap().push(format!("{} {}", op, index));
        }
        fn scroll_to_center(&self, index: usize) {
            self.calls.lock().unwrap().push(format!("scroll {}", index));
        }
    }

    #[derive(Default)]
    struct RecordingPlayer {
        calls: Mutex<Vec<String>>,
    }

    impl PlaybackSource for RecordingPlayer {
        fn current_time(&self) -> Result<f64> {
            Ok(0.0)
        }
        fn seek_to(&self, seconds: f64) {
            self.calls.lock().unwrap().push(format!("seek_to {}", seconds));
        }
        fn play(&self) {
            self.calls.lock().unwrap().push("play".to_string());
        }
    }

    fn state(index: Option<usize>) -> ActiveChunkState {
        ActiveChunkState { index, chunk: None }
    }

    fn controller(view: Arc<RecordingView>, prefs: Arc<MemoryPreferences>) -> SyncController {
        SyncController::new(view, prefs, PlayerHandle::empty())
    }

    #[test]
    fn test_highlight_moves_and_scrolls() {
        let view = Arc::new(RecordingView::default());
        let sync = controller(view.clone(), Arc::new(MemoryPreferences::new()));

        sync.handle(&state(Some(0)));
        sync.handle(&state(Some(2)));
        sync.handle(&state(None));

        assert_eq!(
            view.calls(),
            vec!["mark 0", "scroll 0", "clear 0", "mark 2", "scroll 2", "clear 2"]
        );
        assert_eq!(sync.highlighted(), None);
    }

    #[test]
    fn test_no_scroll_when_disabled() {
        let view = Arc::new(RecordingView::default());
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.set_bool(AUTO_SCROLL_KEY, false).unwrap();
        let sync = controller(view.clone(), prefs);

        assert!(!sync.auto_scroll_enabled());
        sync.handle(&state(Some(1)));
        assert_eq!(view.calls(), vec!["mark 1"]);
    }

    #[test]
    fn test_toggle_persists() {
        let view = Arc::new(RecordingView::default());
        let prefs = Arc::new(MemoryPreferences::new());
        let sync = controller(view, prefs.clone());

        assert!(sync.auto_scroll_enabled());
        assert!(!sync.toggle_auto_scroll().unwrap());
        assert_eq!(prefs.get_bool(AUTO_SCROLL_KEY), Some(false));
        assert!(sync.toggle_auto_scroll().unwrap());
        assert_eq!(prefs.get_bool(AUTO_SCROLL_KEY), Some(true));
    }

    #[test]
    fn test_default_only_applies_when_unset() {
        let view = Arc::new(RecordingView::default());
        let prefs = Arc::new(MemoryPreferences::new());
        let sync = controller(view.clone(), prefs.clone()).with_auto_scroll_default(false);
        assert!(!sync.auto_scroll_enabled());

        prefs.set_bool(AUTO_SCROLL_KEY, true).unwrap();
        let sync = controller(view, prefs).with_auto_scroll_default(false);
        assert!(sync.auto_scroll_enabled());
    }

    #[test]
    fn test_seek_then_play() {
        let player = Arc::new(RecordingPlayer::default());
        let sync = SyncController::new(
            Arc::new(RecordingView::default()),
            Arc::new(MemoryPreferences::new()),
            PlayerHandle::new(player.clone()),
        );

        sync.seek(&Chunk::new(42, 60, "answer"));
        assert_eq!(*player.calls.lock().unwrap(), vec!["seek_to 42", "play"]);
    }

    #[test]
    fn test_seek_without_player_is_noop() {
        let sync = controller(
            Arc::new(RecordingView::default()),
            Arc::new(MemoryPreferences::new()),
        );
        sync.seek(&Chunk::new(10, 20, "nothing happens"));
    }

    #[test]
    fn test_reset_forgets_highlight() {
        let view = Arc::new(RecordingView::default());
        let sync = controller(view.clone(), Arc::new(MemoryPreferences::new()));

        sync.handle(&state(Some(3)));
        sync.reset();
        sync.handle(&state(Some(1)));

        assert_eq!(view.calls(), vec!["mark 3", "scroll 3", "mark 1", "scroll 1"]);
    }
}
