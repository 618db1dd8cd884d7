use super::{Summarizer, SummaryContent};
use crate::config::SummaryConfig;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const SUMMARY_TITLE: &str = "Video Summary";

/// Chat-completions backends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LLMProvider {
    OpenAI,
    LMStudio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Summarizes transcripts through an OpenAI-compatible chat endpoint
pub struct LlmSummarizer {
    config: SummaryConfig,
    client: reqwest::Client,
}

impl LlmSummarizer {
    pub fn new(config: SummaryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        match (&self.config.provider, self.config.endpoint.as_deref()) {
            (_, Some(endpoint)) => endpoint,
            (LLMProvider::OpenAI, None) => OPENAI_CHAT_URL,
            (LLMProvider::LMStudio, None) => "http://localhost:1234/v1/chat/completions",
        }
    }

    fn build_request(&self, transcript: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.config.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Please summarize this YouTube video transcript:\n\n{}",
                        transcript
                    ),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<SummaryContent> {
        let api_key = self.config.api_key.as_deref().filter(|key| !key.trim().is_empty());
        if self.config.provider == LLMProvider::OpenAI && api_key.is_none() {
            return Err(SyncError::Configuration(
                "Please set your OpenAI API key first.".to_string(),
            ));
        }

        let endpoint = self.endpoint();
        debug!("Sending summary request to {:?} at {}", self.config.provider, endpoint);

        let mut request = self.client.post(endpoint).json(&self.build_request(transcript));
        if let Some(key) = api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(SyncError::Summarizer(message));
        }

        let chat: ChatResponse = response.json().await?;
        let body = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| "No summary generated".to_string());

        Ok(SummaryContent::new(SUMMARY_TITLE, body))
    }
}
