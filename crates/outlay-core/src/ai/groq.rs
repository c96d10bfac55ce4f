//! Groq backend implementation
//!
//! Talks to Groq's OpenAI-compatible `/openai/v1/chat/completions` endpoint.
//! Requests are deterministic (temperature 0) and bounded by a 10 second
//! timeout; there are no retries. An unreachable or misbehaving service is
//! "no signal", not an error to surface.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GROQ_API_KEY`: API key (required)
//! - `GROQ_MODEL`: Model name (default: llama-3.1-70b-versatile)
//! - `GROQ_HOST`: Server URL (default: https://api.groq.com)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categories::ALLOWED_CATEGORIES;

use super::parsing::parse_reply;
use super::{ClassifierBackend, ClassifierOutcome};

const DEFAULT_HOST: &str = "https://api.groq.com";
const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";

/// Request timeout. Classification is a synchronous hop in the request
/// path, so it must be bounded tightly.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Groq chat-completions backend.
#[derive(Clone)]
pub struct GroqBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GroqBackend {
    /// Create a new Groq backend.
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from environment variables.
    ///
    /// Returns None when `GROQ_API_KEY` is unset or blank; the feature
    /// degrades gracefully instead of failing requests.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GROQ_API_KEY").ok()?.trim().to_string();
        if api_key.is_empty() {
            return None;
        }
        let host = std::env::var("GROQ_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&host, &model, &api_key))
    }

    /// The fixed system instruction: allowed-category enumeration plus a
    /// strict-JSON directive. Built from the same list the normalizer
    /// validates against, so the two cannot diverge.
    fn system_prompt() -> String {
        format!(
            "You are a financial expense categorizer. Allowed categories: {}. \
             Given a user input, respond ONLY as JSON: \
             {{\"category\": one of the allowed, \"confidence\": number 0..1}}.",
            ALLOWED_CATEGORIES.join(", ")
        )
    }

    async fn chat_completion(&self, raw_text: &str) -> crate::error::Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: raw_text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .http_client
            .post(format!("{}/openai/v1/chat/completions", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            return Err(crate::error::Error::InvalidData(format!(
                "Groq API error {}: {}",
                status, snippet
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| crate::error::Error::InvalidData("No choices in Groq reply".into()))
    }
}

/// OpenAI-style chat completion request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl ClassifierBackend for GroqBackend {
    async fn classify(&self, raw_text: &str) -> ClassifierOutcome {
        let reply = match self.chat_completion(raw_text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Groq classification unavailable");
                return ClassifierOutcome::Unavailable;
            }
        };
        debug!(reply = %reply, "Groq classification reply");

        match parse_reply(&reply) {
            Some(suggestion) => ClassifierOutcome::Suggestion(suggestion),
            None => {
                warn!(reply = %reply, "Unparseable Groq reply");
                ClassifierOutcome::Malformed
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/openai/v1/models", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
