use super::{Summarizer, Summary};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A stored summary and when it was stored
#[derive(Debug, Clone)]
pub struct CachedSummary {
    pub summary: Summary,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CacheState {
    entry: Option<CachedSummary>,
    /// Video of the most recent `get_summary` or `refresh` call
    requested: Option<String>,
}

/// Holds at most one summary, keyed by video id.
///
/// A new video id replaces the previous entry. Failed summaries are cached
/// too so repeated clicks do not hammer a failing upstream; `refresh` is the
/// explicit retry. A fetch that completes after another video was requested
/// is returned to its caller but never stored.
#[derive(Debug, Default)]
pub struct SummaryCache {
    state: Mutex<CacheState>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Cached summary for `video_id`, if that is the video currently cached
    pub fn get(&self, video_id: &str) -> Option<Summary> {
        self.lock()
            .entry
            .as_ref()
            .filter(|cached| cached.summary.video_id() == video_id)
            .map(|cached| cached.summary.clone())
    }

    /// Whatever is cached, regardless of video
    pub fn peek(&self) -> Option<CachedSummary> {
        self.lock().entry.clone()
    }

    pub fn cached_video_id(&self) -> Option<String> {
        self.lock()
            .entry
            .as_ref()
            .map(|cached| cached.summary.video_id().to_string())
    }

    /// Return the cached summary for `video_id`, or fetch, store and return a new one
    pub async fn get_summary(
        &self,
        video_id: &str,
        transcript: &str,
        summarizer: &dyn Summarizer,
    ) -> Summary {
        {
            let mut state = self.lock();
            state.requested = Some(video_id.to_string());
            let hit = state
                .entry
                .as_ref()
                .filter(|cached| cached.summary.video_id() == video_id)
                .map(|cached| cached.summary.clone());
            if let Some(summary) = hit {
                debug!("📚 Summary cache hit for {}", video_id);
                return summary;
            }
        }

        debug!("Summary cache miss for {}", video_id);
        self.fetch_and_store(video_id, transcript, summarizer).await
    }

    /// Bypass the cache and replace the entry with a fresh result
    pub async fn refresh(
        &self,
        video_id: &str,
        transcript: &str,
        summarizer: &dyn Summarizer,
    ) -> Summary {
        info!("🔄 Refreshing summary for {}", video_id);
        self.lock().requested = Some(video_id.to_string());
        self.fetch_and_store(video_id, transcript, summarizer).await
    }

    async fn fetch_and_store(
        &self,
        video_id: &str,
        transcript: &str,
        summarizer: &dyn Summarizer,
    ) -> Summary {
        let summary = Summary::from_outcome(video_id, summarizer.summarize(transcript).await);

        match &summary {
            Summary::Ready { .. } => info!("✨ Summary generated for {}", video_id),
            Summary::Failed { error, .. } => warn!("Summary failed for {}: {}", video_id, error),
        }

        let mut state = self.lock();
        if state.requested.as_deref() != Some(video_id) {
            debug!("Discarding superseded summary for {}", video_id);
            return summary;
        }

        state.entry = Some(CachedSummary {
            summary: summary.clone(),
            stored_at: Utc::now(),
        });

        summary
    }

    pub fn invalidate(&self) {
        if self.lock().entry.take().is_some() {
            debug!("🗑️ Summary cache cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SyncError};
    use crate::summary::SummaryContent;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSummarizer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        async fn summarize(&self, transcript: &str) -> Result<SummaryContent> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(SyncError::Summarizer("upstream down".to_string()));
            }
            Ok(SummaryContent::new(format!("Summary {}", n), transcript.to_uppercase()))
        }
    }

    struct DelayedSummarizer {
        delay: Duration,
    }

    #[async_trait]
    impl Summarizer for DelayedSummarizer {
        async fn summarize(&self, transcript: &str) -> Result<SummaryContent> {
            tokio::time::sleep(self.delay).await;
            Ok(SummaryContent::new("Video Summary", transcript))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_for_previous_video_is_not_stored() {
        let cache = Arc::new(SummaryCache::new());

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move {
                let summarizer = DelayedSummarizer {
                    delay: Duration::from_millis(500),
                };
                cache.get_summary("v1", "first video", &summarizer).await
            })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        let fast = DelayedSummarizer {
            delay: Duration::from_millis(10),
        };
        let current = cache.get_summary("v2", "second video", &fast).await;
        assert_eq!(cache.cached_video_id().as_deref(), Some("v2"));

        let late = slow.await.unwrap();
        assert_eq!(late.video_id(), "v1");
        assert_eq!(cache.cached_video_id().as_deref(), Some("v2"));
        assert_eq!(cache.get("v2"), Some(current));
    }

    #[test]
    fn test_same_video_fetches_once() {
        tokio_test::block_on(async {
            let cache = SummaryCache::new();
            let summarizer = CountingSummarizer::default();

            let first = cache.get_summary("v1", "text", &summarizer).await;
            let second = cache.get_summary("v1", "text", &summarizer).await;

            assert_eq!(first, second);
            assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_new_video_replaces_entry() {
        tokio_test::block_on(async {
            let cache = SummaryCache::new();
            let summarizer = CountingSummarizer::default();

            cache.get_summary("v1", "one", &summarizer).await;
            let second = cache.get_summary("v2", "two", &summarizer).await;

            assert_eq!(summarizer.calls.load(Ordering::SeqCst), 2);
            assert_eq!(second.video_id(), "v2");
            assert!(cache.get("v1").is_none());
            assert_eq!(cache.cached_video_id().as_deref(), Some("v2"));
        });
    }

    #[test]
    fn test_failures_are_cached_until_refresh() {
        tokio_test::block_on(async {
            let cache = SummaryCache::new();
            let summarizer = CountingSummarizer {
                fail: true,
                ..Default::default()
            };

            let first = cache.get_summary("v1", "text", &summarizer).await;
            assert!(!first.is_authoritative());
            cache.get_summary("v1", "text", &summarizer).await;
            assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);

            cache.refresh("v1", "text", &summarizer).await;
            assert_eq!(summarizer.calls.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn test_invalidate() {
        tokio_test::block_on(async {
            let cache = SummaryCache::new();
            let summarizer = CountingSummarizer::default();

            cache.get_summary("v1", "text", &summarizer).await;
            assert!(cache.peek().is_some());
            cache.invalidate();
            assert!(cache.peek().is_none());

            cache.get_summary("v1", "text", &summarizer).await;
            assert_eq!(summarizer.calls.load(Ordering::SeqCst), 2);
        });
    }
}
