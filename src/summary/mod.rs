/// Video summaries: the summarizer seam, the per-video cache and an LLM client

pub mod cache;
pub mod llm;

pub use cache::{CachedSummary, SummaryCache};
pub use llm::{LLMProvider, LlmSummarizer};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Successful summarizer output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryContent {
    pub title: String,
    pub body: String,
}

impl SummaryContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Summary of one video, or the reason it could not be produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Summary {
    Ready {
        video_id: String,
        title: String,
        body: String,
    },
    Failed {
        video_id: String,
        error: String,
    },
}

impl Summary {
    /// Build a summary from a summarizer outcome
    pub fn from_outcome(video_id: &str, outcome: Result<SummaryContent>) -> Self {
        match outcome {
            Ok(content) => Summary::Ready {
                video_id: video_id.to_string(),
                title: content.title,
                body: content.body,
            },
            Err(e) => Summary::Failed {
                video_id: video_id.to_string(),
                error: format!("Failed to generate summary: {}", e),
            },
        }
    }

    pub fn video_id(&self) -> &str {
        match self {
            Summary::Ready { video_id, .. } | Summary::Failed { video_id, .. } => video_id,
        }
    }

    /// Failed summaries are cached but callers may retry them
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Summary::Ready { .. })
    }
}

/// Produces a summary for a transcript
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<SummaryContent>;
}
