/// Transcript model, timestamp codec and segment grouping
///
/// Raw fragments scraped from a transcript panel are turned into
/// time-windowed chunks that the playback tracker indexes into.

pub mod clock;
pub mod grouper;
pub mod source;

pub use clock::{format_clock, format_range, parse_clock};
pub use grouper::{full_text, GroupingMode, SegmentGrouper, DEFAULT_WINDOW_SECONDS};
pub use source::{segments_from_rows, FileTranscriptSource, ScrapedRow, TranscriptSource};

use serde::{Deserialize, Serialize};

/// One timestamped text fragment as scraped from the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSegment {
    /// Offset from the start of the video in seconds
    pub offset_seconds: f64,
    /// Fragment text
    pub text: String,
}

impl RawSegment {
    pub fn new(offset_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            offset_seconds,
            text: text.into(),
        }
    }
}

/// A time-windowed group of segments rendered as one unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Start in whole seconds (offset of the first contained segment)
    pub start_seconds: u32,
    /// End in whole seconds (offset of the last contained segment, rounded up)
    pub end_seconds: u32,
    /// Space-joined text of all contained segments
    pub text: String,
}

impl Chunk {
    pub fn new(start_seconds: u32, end_seconds: u32, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    /// Signed span; negative when out-of-order input produced `end < start`
    pub fn span_seconds(&self) -> i64 {
        i64::from(self.end_seconds) - i64::from(self.start_seconds)
    }

    /// Bracketed range label, e.g. `[0:00 – 0:28]`
    pub fn label(&self) -> String {
        format!("[{}]", format_range(self.start_seconds, self.end_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_label() {
        let chunk = Chunk::new(30, 3605, "text");
        assert_eq!(chunk.label(), "[0:30 – 1:00:05]");
    }

    #[test]
    fn test_span_can_be_negative() {
        let chunk = Chunk::new(40, 10, "late fragment");
        assert_eq!(chunk.span_seconds(), -30);
    }

    #[test]
    fn test_raw_segment_json_shape() {
        let segment: RawSegment =
            serde_json::from_str(r#"{"offset_seconds": 12.5, "text": "hello"}"#).unwrap();
        assert_eq!(segment, RawSegment::new(12.5, "hello"));
    }
}
