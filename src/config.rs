use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sink::OutputMode;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub input: InputConfig,
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub source_path: PathBuf,
    pub question_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    #[serde(default)]
    pub chunk_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gpt-4-1106-preview".to_string()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_api_key_env() -> String {
    "SECRET_SH_OPEN_AI_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub persist: bool,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Resolve the sink for this run.
    pub fn output_mode(&self) -> OutputMode {
        match (self.output.persist, &self.output.path) {
            (true, Some(path)) => OutputMode::Persist(path.clone()),
            _ => OutputMode::Display,
        }
    }
}

impl CompletionConfig {
    /// Read the API key from the environment variable named by `api_key_env`.
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// variables already set in the process environment take precedence.
    pub fn resolve_api_key(&self) -> Result<String> {
        dotenvy::dotenv().ok();
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => anyhow::bail!(
                "API key not found: set {} in .env or the environment",
                self.api_key_env
            ),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    if config.chunking.max_chars == 0 {
        anyhow::bail!("chunking.max_chars must be > 0");
    }

    // Validate completion
    if config.completion.model.trim().is_empty() {
        anyhow::bail!("completion.model must not be empty");
    }
    if !(0.0..=2.0).contains(&config.completion.temperature) {
        anyhow::bail!("completion.temperature must be in [0.0, 2.0]");
    }
    if config.completion.timeout_secs == 0 {
        anyhow::bail!("completion.timeout_secs must be > 0");
    }

    // Validate output
    if config.output.persist && config.output.path.is_none() {
        anyhow::bail!("output.path must be specified when output.persist = true");
    }

    Ok(config)
}
