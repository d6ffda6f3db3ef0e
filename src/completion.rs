//! Chat-completion client abstraction and the OpenAI HTTP implementation.
//!
//! The pipeline only depends on [`CompletionClient`]: one prompt in, one
//! [`CompletionReply`] out. Anything that stops the call from reaching the
//! model or being answered (connection failure, timeout, non-2xx status,
//! a 2xx body that is not a chat-completion response) is returned as an
//! error and ends the run. Content problems are not errors here; an empty
//! answer comes back as [`CompletionReply::NoChoices`] or
//! [`CompletionReply::EmptyContent`].
//!
//! # Connection lifetime
//!
//! [`OpenAIClient`] owns a single `reqwest::Client`, and with it the
//! connection pool. Build one per run; dropping it closes the pool.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::CompletionConfig;
use crate::models::{CompletionReply, CompletionRequest};

/// Something that can answer a chat-completion request.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or service failures. These are fatal
    /// to the caller's run.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply>;
}

/// Chat-completion client for the OpenAI API (or any endpoint speaking the
/// same protocol).
pub struct OpenAIClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAIClient {
    /// Create a client from configuration and a resolved API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client cannot be
    /// built.
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("API key is empty");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            prompt_chars = request.messages.last().map(|m| m.content.len()).unwrap_or(0),
            "sending chat completion"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Completion API error {}: {}", status, body_text);
        }

        let json: Value = response
            .json()
            .await
            .context("Invalid completion response: body is not JSON")?;
        parse_completion_response(&json)
    }
}

/// Extract `choices[0].message.content` from a chat-completion response.
pub fn parse_completion_response(json: &Value) -> Result<CompletionReply> {
    let choices = json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid completion response: missing choices array"))?;

    let Some(first) = choices.first() else {
        return Ok(CompletionReply::NoChoices);
    };

    match first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
    {
        Some(text) if !text.trim().is_empty() => Ok(CompletionReply::Content(text.to_string())),
        _ => Ok(CompletionReply::EmptyContent),
    }
}
