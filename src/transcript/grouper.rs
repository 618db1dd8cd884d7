use super::{Chunk, RawSegment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Default chunk window in seconds
pub const DEFAULT_WINDOW_SECONDS: u32 = 30;

/// How segments are assigned to chunks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// Windows start at the first segment of each chunk (extension panel behavior)
    #[default]
    Rolling,
    /// Windows are aligned to multiples of the window width (web app behavior)
    Aligned,
}

/// Groups ordered raw segments into time-windowed chunks
#[derive(Debug, Clone)]
pub struct SegmentGrouper {
    window_seconds: u32,
    mode: GroupingMode,
}

/// Open chunk being filled during a rolling pass
struct Accumulator {
    start: f64,
    last: f64,
    texts: Vec<String>,
}

impl Accumulator {
    fn seed(segment: &RawSegment) -> Self {
        Self {
            start: segment.offset_seconds,
            last: segment.offset_seconds,
            texts: vec![segment.text.trim().to_string()],
        }
    }

    fn push(&mut self, segment: &RawSegment) {
        self.last = segment.offset_seconds;
        self.texts.push(segment.text.trim().to_string());
    }

    fn close(self) -> Chunk {
        Chunk {
            start_seconds: whole_seconds_floor(self.start),
            end_seconds: whole_seconds_ceil(self.last),
            text: self.texts.join(" "),
        }
    }
}

impl SegmentGrouper {
    /// Create a rolling grouper with the given window width
    pub fn new(window_seconds: u32) -> Self {
        Self {
            window_seconds: window_seconds.max(1),
            mode: GroupingMode::Rolling,
        }
    }

    pub fn with_mode(mut self, mode: GroupingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn window_seconds(&self) -> u32 {
        self.window_seconds
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Group segments into chunks. Input order is preserved, never re-sorted.
    pub fn group(&self, segments: &[RawSegment]) -> Vec<Chunk> {
        let chunks = match self.mode {
            GroupingMode::Rolling => self.group_rolling(segments),
            GroupingMode::Aligned => self.group_aligned(segments),
        };

        debug!(
            "Grouped {} segments into {} chunks ({:?}, {}s window)",
            segments.len(),
            chunks.len(),
            self.mode,
            self.window_seconds
        );

        chunks
    }

    fn group_rolling(&self, segments: &[RawSegment]) -> Vec<Chunk> {
        let window = f64::from(self.window_seconds);
        let mut chunks = Vec::new();
        let mut current: Option<Accumulator> = None;

        for segment in segments {
            current = match current.take() {
                None => Some(Accumulator::seed(segment)),
                Some(acc) if segment.offset_seconds - acc.start >= window => {
                    chunks.push(acc.close());
                    Some(Accumulator::seed(segment))
                }
                Some(mut acc) => {
                    acc.push(segment);
                    Some(acc)
                }
            };
        }

        // The last segment always closes the open chunk
        if let Some(acc) = current {
            chunks.push(acc.close());
        }

        chunks
    }

    fn group_aligned(&self, segments: &[RawSegment]) -> Vec<Chunk> {
        let mut buckets: BTreeMap<u32, Vec<&str>> = BTreeMap::new();

        for segment in segments {
            let index = whole_seconds_floor(segment.offset_seconds) / self.window_seconds;
            buckets.entry(index).or_default().push(segment.text.trim());
        }

        buckets
            .into_iter()
            .map(|(index, texts)| Chunk {
                start_seconds: index.saturating_mul(self.window_seconds),
                end_seconds: index.saturating_add(1).saturating_mul(self.window_seconds),
                text: texts.join(" "),
            })
            .collect()
    }
}

impl Default for SegmentGrouper {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECONDS)
    }
}

/// Concatenate all segment texts for summarization, ignoring chunk boundaries
pub fn full_text(segments: &[RawSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

fn whole_seconds_floor(offset: f64) -> u32 {
    offset.max(0.0).floor() as u32
}

fn whole_seconds_ceil(offset: f64) -> u32 {
    offset.max(0.0).ceil() as u32
}
