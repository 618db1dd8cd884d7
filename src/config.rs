use crate::error::{Result, SyncError};
use crate::summary::LLMProvider;
use crate::transcript::{GroupingMode, DEFAULT_WINDOW_SECONDS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the transcript sync engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Chunk grouping settings
    pub segmentation: SegmentationConfig,

    /// Playback polling settings
    pub tracking: TrackingConfig,

    /// Highlight / auto-scroll settings
    pub sync: SyncConfig,

    /// Summarizer settings
    pub summary: SummaryConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Chunk window width in seconds
    pub window_seconds: u32,

    /// How segments are assigned to chunks
    pub mode: GroupingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Playback poll interval in milliseconds
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Auto-scroll state used until the user toggles it
    pub auto_scroll_default: bool,

    /// Where the per-installation preferences are stored (in memory when unset)
    pub preferences_file: Option<PathBuf>,
}

/// Summarizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Chat-completions backend
    pub provider: LLMProvider,

    /// Endpoint override
    pub endpoint: Option<String>,

    /// API key (required for OpenAI)
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// System prompt sent ahead of the transcript
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub level: String,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            mode: GroupingMode::Rolling,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_scroll_default: true,
            preferences_file: None,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            endpoint: None,
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_seconds: 60,
            system_prompt: "You are a helpful assistant that summarizes YouTube video transcripts. \
                Provide a concise but comprehensive summary of the video content, highlighting \
                the main points and key takeaways."
                .to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "transcript_sync=info,warn".to_string(),
        }
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from the first config file found, else from the environment
    pub fn load() -> Result<Self> {
        let config_paths = ["transcript-sync.toml", "config/transcript-sync.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&config_str)?)
    }

    /// Defaults overridden by `TRANSCRIPT_SYNC_*` variables (and `OPENAI_API_KEY`)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(window) = std::env::var("TRANSCRIPT_SYNC_WINDOW_SECONDS") {
            config.segmentation.window_seconds = window
                .parse()
                .map_err(|_| SyncError::Configuration(format!("invalid window: {}", window)))?;
        }

        if let Ok(poll) = std::env::var("TRANSCRIPT_SYNC_POLL_INTERVAL_MS") {
            config.tracking.poll_interval_ms = poll
                .parse()
                .map_err(|_| SyncError::Configuration(format!("invalid poll interval: {}", poll)))?;
        }

        if let Ok(path) = std::env::var("TRANSCRIPT_SYNC_PREFERENCES_FILE") {
            config.sync.preferences_file = Some(PathBuf::from(path));
        }

        if let Ok(endpoint) = std::env::var("TRANSCRIPT_SYNC_LLM_ENDPOINT") {
            config.summary.endpoint = Some(endpoint);
        }

        if let Ok(model) = std::env::var("TRANSCRIPT_SYNC_LLM_MODEL") {
            config.summary.model = model;
        }

        if let Ok(api_key) =
            std::env::var("TRANSCRIPT_SYNC_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
        {
            config.summary.api_key = Some(api_key);
        }

        if let Ok(level) = std::env::var("TRANSCRIPT_SYNC_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.window_seconds == 0 {
            return Err(SyncError::Configuration(
                "window_seconds must be greater than 0".to_string(),
            ));
        }

        if self.tracking.poll_interval_ms == 0 {
            return Err(SyncError::Configuration(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.summary.temperature) {
            return Err(SyncError::Configuration(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if let Some(endpoint) = &self.summary.endpoint {
            url::Url::parse(endpoint)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Transcript Sync Configuration:\n\
            - Window: {}s ({:?})\n\
            - Poll Interval: {}ms\n\
            - Auto-scroll Default: {}\n\
            - Summarizer: {:?} ({})",
            self.segmentation.window_seconds,
            self.segmentation.mode,
            self.tracking.poll_interval_ms,
            self.sync.auto_scroll_default,
            self.summary.provider,
            self.summary.model,
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_window_seconds(mut self, window_seconds: u32) -> Self {
        self.config.segmentation.window_seconds = window_seconds;
        self
    }

    pub fn with_grouping_mode(mut self, mode: GroupingMode) -> Self {
        self.config.segmentation.mode = mode;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.config.tracking.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_auto_scroll_default(mut self, enabled: bool) -> Self {
        self.config.sync.auto_scroll_default = enabled;
        self
    }

    pub fn with_preferences_file(mut self, path: PathBuf) -> Self {
        self.config.sync.preferences_file = Some(path);
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.summary.api_key = Some(api_key);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.segmentation.window_seconds, 30);
        assert_eq!(config.tracking.poll_interval(), Duration::from_millis(100));
        assert!(config.sync.auto_scroll_default);
        assert_eq!(config.summary.provider, LLMProvider::OpenAI);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_window_seconds(45)
            .with_grouping_mode(GroupingMode::Aligned)
            .with_poll_interval_ms(250)
            .with_auto_scroll_default(false)
            .build();

        assert_eq!(config.segmentation.window_seconds, 45);
        assert_eq!(config.segmentation.mode, GroupingMode::Aligned);
        assert_eq!(config.tracking.poll_interval_ms, 250);
        assert!(!config.sync.auto_scroll_default);
    }

    #[test]
    fn test_config_validation() {
        let config = ConfigBuilder::new().with_window_seconds(0).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_poll_interval_ms(0).build();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.summary.endpoint = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [segmentation]
            window_seconds = 60
            mode = "aligned"

            [summary]
            provider = "LMStudio"
            "#,
        )
        .unwrap();

        assert_eq!(config.segmentation.window_seconds, 60);
        assert_eq!(config.segmentation.mode, GroupingMode::Aligned);
        assert_eq!(config.summary.provider, LLMProvider::LMStudio);
        assert_eq!(config.summary.model, "gpt-3.5-turbo");
        assert_eq!(config.tracking.poll_interval_ms, 100);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript-sync.toml");
        let path = path.to_str().unwrap();

        let config = ConfigBuilder::new().with_window_seconds(20).build();
        config.save(path).unwrap();

        let loaded = Config::from_file(path).unwrap();
        assert_eq!(loaded.segmentation.window_seconds, 20);
    }
}
