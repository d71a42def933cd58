//! AI responder for question posts
//!
//! The responder is an opaque text-generation service. The HTTP adapter
//! speaks the OpenAI-compatible chat completions protocol and owns only
//! transport concerns: request shape, timeout, status mapping and decoding.

use crate::config::AiConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are AphidAI, a helpful assistant answering questions posted \
    to a community forum. Answer in a friendly tone and keep it under 200 words.";

/// Longest error body kept in a [`ResponderError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Failures talking to the text-generation service
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("AI responder is disabled")]
    Disabled,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode upstream response: {0}")]
    Decode(String),
    #[error("upstream returned no answer")]
    Empty,
}

/// Generates an answer for a question post
#[async_trait]
pub trait AiResponder: Send + Sync {
    async fn answer(&self, title: &str, text: &str) -> Result<String, ResponderError>;
}

/// Responder used when AI answers are switched off
pub struct DisabledResponder;

#[async_trait]
impl AiResponder for DisabledResponder {
    async fn answer(&self, _title: &str, _text: &str) -> Result<String, ResponderError> {
        Err(ResponderError::Disabled)
    }
}

/// Build the responder described by `config`
pub fn responder_from_config(config: &AiConfig) -> Result<Arc<dyn AiResponder>, reqwest::Error> {
    if !config.enabled {
        return Ok(Arc::new(DisabledResponder));
    }
    let responder = OpenAiResponder::new(
        &config.api_base,
        &config.api_key,
        &config.model,
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Arc::new(responder))
}

/// Chat completions adapter
pub struct OpenAiResponder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiResponder {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl AiResponder for OpenAiResponder {
    async fn answer(&self, title: &str, text: &str) -> Result<String, ResponderError> {
        let question = format!("{}\n\n{}", title.trim(), text.trim());
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &question,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ResponderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ResponderError::Transport(e.to_string()))?;
        if !status.is_success() {
            let snippet: String = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(ResponderError::Status {
                status,
                body: snippet,
            });
        }

        parse_answer(&body)
    }
}

fn parse_answer(body: &[u8]) -> Result<String, ResponderError> {
    let decoded: ChatResponse =
        serde_json::from_slice(body).map_err(|e| ResponderError::Decode(e.to_string()))?;
    decoded
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ResponderError::Empty)
}
