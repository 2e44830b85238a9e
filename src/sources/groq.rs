//! Social-copy generator backed by an OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, CopyGenerator, CopyRequest};
use crate::error::ProducerError;

const SYSTEM_PROMPT: &str = "You are a social media strategist for short-form quote content. \
Reply with a single JSON object and nothing else.";

#[derive(Debug, Clone)]
pub struct GroqClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl GroqClient {
    /// # Arguments
    /// * `base_url` - e.g. "https://api.groq.com/openai/v1"
    /// * `model` - chat model name
    /// * `api_key` - bearer token
    /// * `timeout` - bound on the whole request
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn prompt(request: &CopyRequest) -> String {
        format!(
            "Quote: \"{}\" by {}\nTopic: {}\n\n\
             Write social media copy for a short looping quote video. Return JSON with keys:\n\
             caption (2-3 sentences), hashtags (array of 5-8 strings), \
             background_keywords (array of 2-4 photo search words), \
             visual_style, audio_suggestion, call_to_action, posting_time_suggestion.",
            request.quote, request.author, request.topic
        )
    }
}

#[async_trait]
impl CopyGenerator for GroqClient {
    async fn generate_copy(&self, request: &CopyRequest) -> Result<String, ProducerError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(request),
                },
            ],
            temperature: 0.7,
            max_tokens: 500,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.model, topic = %request.topic, "requesting social copy");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response: ChatResponse = check_status("chat completions", response)?.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProducerError::Upstream("chat completion had no content".to_string()))
    }
}
