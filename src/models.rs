//! Core data models used throughout chunkq.
//!
//! These types represent the source document, its chunks, and the requests
//! and replies that flow through the chunked-query pipeline.

use serde::Serialize;
use std::path::PathBuf;

/// Source text loaded once at the start of a run.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
}

/// A positional slice of a [`SourceDocument`].
///
/// `index` is 1-based and defines processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// One message in a chat-completion request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Wire payload for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Build a request with a system instruction followed by the user prompt.
    pub fn new(model: &str, temperature: f64, system_prompt: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

/// Raw outcome of one completion call.
///
/// `NoChoices` and `EmptyContent` both contribute nothing downstream but
/// are reported differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReply {
    Content(String),
    NoChoices,
    EmptyContent,
}
