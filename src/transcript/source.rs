use super::{parse_clock, RawSegment};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Supplies raw transcript segments for the current video.
///
/// `None` means no transcript is available. Implementations swallow their own
/// failures into `None`; the engine never sees a scrape error.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_raw_segments(&self) -> Option<Vec<RawSegment>>;
}

/// A transcript row as it appears on the page: clock label plus text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapedRow {
    pub time: String,
    pub text: String,
}

impl ScrapedRow {
    pub fn new(time: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            text: text.into(),
        }
    }
}

/// Normalize scraped rows: trim text, drop empty rows, parse clock labels leniently
pub fn segments_from_rows(rows: &[ScrapedRow]) -> Vec<RawSegment> {
    rows.iter()
        .filter_map(|row| {
            let text = row.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(RawSegment::new(f64::from(parse_clock(&row.time)), text))
        })
        .collect()
}

/// Reads a transcript from disk.
///
/// `.json` files may hold either `RawSegment` objects or `ScrapedRow`
/// objects. Anything else is read as lines of `M:SS text`.
#[derive(Debug, Clone)]
pub struct FileTranscriptSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Segments(Vec<RawSegment>),
    Rows(Vec<ScrapedRow>),
}

impl FileTranscriptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<RawSegment>> {
        let content = tokio::fs::read_to_string(&self.path).await?;

        let is_json = self
            .path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let segments = if is_json {
            match serde_json::from_str::<TranscriptFile>(&content)? {
                TranscriptFile::Segments(segments) => segments
                    .into_iter()
                    .filter(|segment| !segment.text.trim().is_empty())
                    .collect(),
                TranscriptFile::Rows(rows) => segments_from_rows(&rows),
            }
        } else {
            parse_transcript_lines(&content)
        };

        Ok(segments)
    }
}

#[async_trait]
impl TranscriptSource for FileTranscriptSource {
    async fn fetch_raw_segments(&self) -> Option<Vec<RawSegment>> {
        match self.load().await {
            Ok(segments) if segments.is_empty() => {
                info!("📜 No transcript lines found in {}", self.path.display());
                None
            }
            Ok(segments) => {
                info!(
                    "📜 Loaded {} transcript segments from {}",
                    segments.len(),
                    self.path.display()
                );
                Some(segments)
            }
            Err(e) => {
                warn!("Failed to read transcript {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*\[?(\d+(?::\d{1,2}){1,2})\]?\s*[-–]?\s*(.*)$")
            .expect("transcript line pattern is valid")
    })
}

/// Parse `M:SS text` / `[H:MM:SS] text` lines; lines without a leading clock are skipped
pub fn parse_transcript_lines(content: &str) -> Vec<RawSegment> {
    let rows: Vec<ScrapedRow> = content
        .lines()
        .filter_map(|line| match line_pattern().captures(line) {
            Some(caps) => Some(ScrapedRow::new(&caps[1], &caps[2])),
            None => {
                if !line.trim().is_empty() {
                    debug!("Skipping transcript line without timestamp: {}", line.trim());
                }
                None
            }
        })
        .collect();

    segments_from_rows(&rows)
}
