//! The two query flows and the commands that drive them.
//!
//! [`Pipeline`] holds one [`CompletionClient`] plus the fixed request
//! parameters for a run and offers two entry points:
//!
//! - [`Pipeline::run_chunked`]: one request per chunk, replies normalized
//!   and aggregated in chunk order.
//! - [`Pipeline::ask`]: the whole source and the question in a single
//!   request, reply returned as-is.
//!
//! Both share the prompt builder and the client. The `run_*` functions at
//! the bottom load inputs from [`Config`], build a pipeline for the run, and
//! deliver the output; the client and its connections are dropped when they
//! return.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::aggregate::aggregate;
use crate::chunk::split_text;
use crate::chunk_store;
use crate::completion::{CompletionClient, OpenAIClient};
use crate::config::{CompletionConfig, Config};
use crate::models::{Chunk, CompletionReply, CompletionRequest, SourceDocument};
use crate::normalize::normalize_reply;
use crate::prompt::build_prompt;
use crate::sink;

pub struct Pipeline {
    client: Box<dyn CompletionClient>,
    model: String,
    temperature: f64,
    system_prompt: String,
}

impl Pipeline {
    pub fn new(client: Box<dyn CompletionClient>, completion: &CompletionConfig) -> Self {
        Self {
            client,
            model: completion.model.clone(),
            temperature: completion.temperature,
            system_prompt: completion.system_prompt.clone(),
        }
    }

    /// Build a pipeline backed by [`OpenAIClient`], resolving the API key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.completion.resolve_api_key()?;
        let client = OpenAIClient::new(&config.completion, api_key)?;
        Ok(Self::new(Box::new(client), &config.completion))
    }

    fn request_for(&self, content: &str, question: &str) -> CompletionRequest {
        CompletionRequest::new(
            &self.model,
            self.temperature,
            &self.system_prompt,
            build_prompt(content, question),
        )
    }

    /// Query one chunk and normalize the reply.
    ///
    /// Transport errors propagate; unusable content yields an empty list.
    pub async fn query_chunk(&self, chunk: &Chunk, question: &str) -> Result<Vec<Value>> {
        let request = self.request_for(&chunk.text, question);
        let reply = self.client.complete(&request).await?;
        Ok(normalize_reply(&reply, chunk.index))
    }

    /// Query every chunk in order and return the flattened records.
    pub async fn run_chunked(&self, chunks: &[Chunk], question: &str) -> Result<Vec<Value>> {
        aggregate(chunks, |chunk| self.query_chunk(chunk, question)).await
    }

    /// Send the whole text and the question as one request.
    pub async fn ask(&self, content: &str, question: &str) -> Result<CompletionReply> {
        let request = self.request_for(content, question);
        self.client.complete(&request).await
    }
}

/// Read the source document named in the config.
pub fn load_source(config: &Config) -> Result<SourceDocument> {
    let path = config.input.source_path.clone();
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;
    Ok(SourceDocument { path, text })
}

/// Read the question text named in the config.
pub fn load_question(config: &Config) -> Result<String> {
    let path = &config.input.question_path;
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question file: {}", path.display()))
}

fn chunk_dir(config: &Config) -> Result<&Path> {
    match &config.chunking.chunk_dir {
        Some(dir) => Ok(dir.as_path()),
        None => bail!("chunking.chunk_dir must be set to write or resume chunk files"),
    }
}

/// Split the source and, when `chunking.chunk_dir` is set, mirror the
/// chunks to disk.
fn prepare_chunks(config: &Config) -> Result<Vec<Chunk>> {
    let source = load_source(config)?;
    let chunks = split_text(&source.text, config.chunking.max_chars)?;
    info!(
        source = %source.path.display(),
        chars = source.text.chars().count(),
        chunks = chunks.len(),
        "source split"
    );

    if let Some(dir) = &config.chunking.chunk_dir {
        chunk_store::write_chunks(dir, &chunks)?;
        info!(dir = %dir.display(), "chunk files written");
    }

    Ok(chunks)
}

/// `chunkq split`: write chunk files without querying anything.
pub fn run_split(config: &Config) -> Result<()> {
    let dir = chunk_dir(config)?;
    let chunks = prepare_chunks(config)?;

    println!("split");
    println!("  chunks: {}", chunks.len());
    println!("  dir: {}", dir.display());
    Ok(())
}

/// `chunkq run`: the chunked pipeline, from inputs to delivered output.
///
/// With `resume`, chunks are read back from `chunking.chunk_dir` instead of
/// splitting the source. On a transport failure nothing is delivered.
pub async fn run_chunked(config: &Config, resume: bool) -> Result<()> {
    let mode = config.output_mode();
    let question = load_question(config)?;
    let chunks = if resume {
        let dir = chunk_dir(config)?;
        let chunks = chunk_store::read_chunks(dir)?;
        info!(dir = %dir.display(), chunks = chunks.len(), "resuming from chunk files");
        chunks
    } else {
        prepare_chunks(config)?
    };

    let pipeline = Pipeline::from_config(config)?;
    let records = pipeline.run_chunked(&chunks, &question).await?;
    drop(pipeline);

    info!(chunks = chunks.len(), records = records.len(), "aggregation complete");
    sink::deliver(&records, &mode)
}

/// `chunkq ask`: the single-shot flow.
pub async fn run_ask(config: &Config) -> Result<()> {
    let source = load_source(config)?;
    let question = load_question(config)?;

    let pipeline = Pipeline::from_config(config)?;
    info!(model = %config.completion.model, "sending single request");
    match pipeline.ask(&source.text, &question).await? {
        CompletionReply::Content(text) => println!("AI reply:\n{}", text),
        CompletionReply::NoChoices => println!("AI reply: [No choices returned]"),
        CompletionReply::EmptyContent => println!("AI reply: [Empty content]"),
    }
    Ok(())
}
