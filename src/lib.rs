/// Transcript Sync
///
/// Segmentation and playback-synchronization engine for video transcript
/// panels: groups scraped transcript fragments into time-windowed chunks,
/// tracks which chunk is active as the video plays, drives highlight,
/// auto-scroll and click-to-seek, and caches one summary per video.

pub mod config;
pub mod error;
pub mod playback;
pub mod session;
pub mod summary;
pub mod sync;
pub mod transcript;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Result, SyncError};
pub use crate::playback::{
    ActiveChunkResolver, ActiveChunkState, PlaybackSource, PlaybackTracker, PlayerHandle,
    SimulatedPlayer, TrackerStatus,
};
pub use crate::session::{video_id_from_url, TranscriptPanel, VideoSession};
pub use crate::summary::{LlmSummarizer, Summarizer, Summary, SummaryCache, SummaryContent};
pub use crate::sync::{
    ChunkView, FilePreferences, MemoryPreferences, PreferenceStore, SyncController,
    TranscriptState,
};
pub use crate::transcript::{
    format_clock, parse_clock, Chunk, FileTranscriptSource, GroupingMode, RawSegment,
    SegmentGrouper, TranscriptSource,
};
