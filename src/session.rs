//! Video session lifecycle for one transcript panel
//!
//! The panel owns exactly one `VideoSession` at a time. A new video id
//! replaces the session wholesale; the tracker is always stopped before the
//! old session goes away and only started after the new chunks are rendered.

use crate::config::Config;
use crate::error::Result;
use crate::playback::{PlaybackTracker, PlayerHandle};
use crate::summary::{Summarizer, Summary, SummaryCache};
use crate::sync::{ChunkView, PreferenceStore, SyncController, TranscriptState};
use crate::transcript::{full_text, Chunk, SegmentGrouper, TranscriptSource};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Everything known about the video currently shown
#[derive(Debug, Clone)]
pub struct VideoSession {
    pub video_id: String,
    pub chunks: Arc<[Chunk]>,
    /// Whole transcript as plain text, for summarization
    pub full_text: String,
    pub summary: Option<Summary>,
}

impl VideoSession {
    pub fn new(video_id: impl Into<String>, chunks: Vec<Chunk>, full_text: String) -> Self {
        Self {
            video_id: video_id.into(),
            chunks: chunks.into(),
            full_text,
            summary: None,
        }
    }

    pub fn has_transcript(&self) -> bool {
        !self.chunks.is_empty()
    }
}

/// Inputs for a summary fetch that can run detached from the panel
#[derive(Clone)]
pub struct SummaryRequest {
    pub video_id: String,
    pub transcript: String,
    cache: Arc<SummaryCache>,
}

impl SummaryRequest {
    pub async fn run(&self, summarizer: &dyn Summarizer) -> Summary {
        self.cache
            .get_summary(&self.video_id, &self.transcript, summarizer)
            .await
    }

    pub async fn retry(&self, summarizer: &dyn Summarizer) -> Summary {
        self.cache
            .refresh(&self.video_id, &self.transcript, summarizer)
            .await
    }
}

/// Extract the video id from a watch URL (`?v=` or a youtu.be short link)
pub fn video_id_from_url(url: &str) -> Result<Option<String>> {
    let url = Url::parse(url)?;

    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return Ok(Some(id.into_owned()).filter(|id| !id.is_empty()));
    }

    if url.host_str() == Some("youtu.be") {
        let id = url.path().trim_start_matches('/');
        if !id.is_empty() {
            return Ok(Some(id.to_string()));
        }
    }

    Ok(None)
}

/// Orchestrates grouping, rendering, tracking and summaries for one panel.
///
/// Must be created inside a tokio runtime: it spawns the task that feeds
/// tracker events into the sync controller.
pub struct TranscriptPanel {
    grouper: SegmentGrouper,
    tracker: PlaybackTracker,
    controller: Arc<SyncController>,
    cache: Arc<SummaryCache>,
    session: Option<VideoSession>,
    minimized: bool,
    event_task: JoinHandle<()>,
}

impl TranscriptPanel {
    pub fn new(
        config: &Config,
        view: Arc<dyn ChunkView>,
        preferences: Arc<dyn PreferenceStore>,
        player: PlayerHandle,
    ) -> Self {
        let grouper = SegmentGrouper::new(config.segmentation.window_seconds)
            .with_mode(config.segmentation.mode);
        let (tracker, events) = PlaybackTracker::new(config.tracking.poll_interval());
        let controller = Arc::new(
            SyncController::new(view, preferences, player)
                .with_auto_scroll_default(config.sync.auto_scroll_default),
        );
        let event_task = tokio::spawn(controller.clone().run(events));

        Self {
            grouper,
            tracker,
            controller,
            cache: Arc::new(SummaryCache::new()),
            session: None,
            minimized: false,
            event_task,
        }
    }

    pub fn controller(&self) -> &Arc<SyncController> {
        &self.controller
    }

    pub fn session(&self) -> Option<&VideoSession> {
        self.session.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Replace the current session with one for `video_id`
    pub async fn open(&mut self, video_id: &str, source: &dyn TranscriptSource) {
        self.tracker.stop().await;
        self.session = None;
        self.controller.view().render(&TranscriptState::Loading);

        info!("🎬 Opening transcript for video {}", video_id);

        let segments = source.fetch_raw_segments().await.unwrap_or_default();
        let chunks = self.grouper.group(&segments);
        let session = VideoSession::new(video_id, chunks, full_text(&segments));

        if session.has_transcript() {
            self.controller
                .view()
                .render(&TranscriptState::Chunks(&session.chunks));
            info!("📜 {} chunks ready for {}", session.chunks.len(), video_id);
        } else {
            self.controller.view().render(&TranscriptState::Empty);
            info!("📜 No transcript available for {}", video_id);
        }

        self.session = Some(session);
        self.controller.reset();
        self.resume_tracking().await;
    }

    /// Open `url` if it names a different video than the current session.
    /// Returns whether a new session was opened.
    pub async fn navigate(&mut self, url: &str, source: &dyn TranscriptSource) -> Result<bool> {
        let Some(video_id) = video_id_from_url(url)? else {
            debug!("No video id in {}", url);
            return Ok(false);
        };

        if self.session.as_ref().map(|s| s.video_id.as_str()) == Some(video_id.as_str()) {
            return Ok(false);
        }

        self.open(&video_id, source).await;
        Ok(true)
    }

    async fn resume_tracking(&mut self) {
        if self.minimized {
            return;
        }
        if let Some(session) = self.session.as_ref().filter(|s| s.has_transcript()) {
            self.tracker
                .start(session.chunks.clone(), self.controller.player().clone())
                .await;
        }
    }

    /// Collapse the panel; tracking pauses until `expand`
    pub async fn minimize(&mut self) {
        self.minimized = true;
        self.tracker.stop().await;
    }

    pub async fn expand(&mut self) {
        if !self.minimized {
            return;
        }
        self.minimized = false;
        self.resume_tracking().await;
    }

    /// Seek playback to the chunk at `index`
    pub fn seek_to_chunk(&self, index: usize) -> bool {
        match self.session.as_ref().and_then(|s| s.chunks.get(index)) {
            Some(chunk) => {
                self.controller.seek(chunk);
                true
            }
            None => {
                warn!("No chunk at index {}", index);
                false
            }
        }
    }

    pub fn toggle_auto_scroll(&self) -> Result<bool> {
        self.controller.toggle_auto_scroll()
    }

    /// Snapshot of what a summary fetch needs; `None` without a transcript
    pub fn summary_request(&self) -> Option<SummaryRequest> {
        let session = self.session.as_ref()?;
        if session.full_text.trim().is_empty() {
            return None;
        }
        Some(SummaryRequest {
            video_id: session.video_id.clone(),
            transcript: session.full_text.clone(),
            cache: self.cache.clone(),
        })
    }

    /// Attach a finished summary. Results for a video that is no longer
    /// current are discarded.
    pub fn attach_summary(&mut self, summary: Summary) -> bool {
        match self.session.as_mut() {
            Some(session) if session.video_id == summary.video_id() => {
                session.summary = Some(summary);
                true
            }
            _ => {
                debug!("Discarding superseded summary for {}", summary.video_id());
                false
            }
        }
    }

    /// Fetch (or reuse) the summary for the current video and attach it
    pub async fn request_summary(&mut self, summarizer: &dyn Summarizer) -> Option<Summary> {
        let request = self.summary_request()?;
        let summary = request.run(summarizer).await;
        self.attach_summary(summary.clone());
        Some(summary)
    }

    /// Explicit user retry, bypassing the cache
    pub async fn retry_summary(&mut self, summarizer: &dyn Summarizer) -> Option<Summary> {
        let request = self.summary_request()?;
        let summary = request.retry(summarizer).await;
        self.attach_summary(summary.clone());
        Some(summary)
    }

    /// Tear the panel down: stop tracking and drop the session
    pub async fn close(&mut self) {
        self.tracker.stop().await;
        self.session = None;
        self.controller.view().render(&TranscriptState::Closed);
        self.controller.reset();
        info!("👋 Transcript panel closed");
    }
}

impl Drop for TranscriptPanel {
    fn drop(&mut self) {
        self.event_task.abort();
    }
}
