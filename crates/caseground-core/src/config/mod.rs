//! Configuration management
//!
//! Endpoints, model names and timeouts. The retrieval policy (similarity
//! threshold, per-query result budgets, sentinel strings) lives in
//! [`crate::search`] as constants.

use crate::error::{CasegroundError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Local Ollama service (embeddings and local generation)
    #[serde(default)]
    pub local: LocalServiceConfig,

    /// Hosted generation service
    #[serde(default)]
    pub cloud: CloudServiceConfig,

    /// Retrieval execution settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Prompt overrides
    #[serde(default)]
    pub prompts: PromptConfig,
}

/// Local Ollama service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalServiceConfig {
    /// Base URL of the Ollama API (e.g. `http://localhost:11434/api`)
    #[serde(default = "default_local_url")]
    pub url: String,

    /// Model used for embeddings; must match the model the index was built with
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Model used for local report generation
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Timeout for a single embedding request, in seconds
    #[serde(default = "default_embed_timeout")]
    pub embed_timeout_secs: u64,

    /// Connect timeout for streaming generation, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for LocalServiceConfig {
    fn default() -> Self {
        Self {
            url: default_local_url(),
            embedding_model: default_embedding_model(),
            generation_model: default_generation_model(),
            embed_timeout_secs: default_embed_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Hosted (Anthropic Messages API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudServiceConfig {
    /// Base URL of the API
    #[serde(default = "default_cloud_url")]
    pub url: String,

    /// Model name
    #[serde(default = "default_cloud_model")]
    pub model: String,

    /// API key; read from `ANTHROPIC_API_KEY` when absent from the file
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Value sent as the `anthropic-version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Connect timeout, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for CloudServiceConfig {
    fn default() -> Self {
        Self {
            url: default_cloud_url(),
            model: default_cloud_model(),
            api_key: default_api_key(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl CloudServiceConfig {
    /// API key with all but the first and last four characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }
}

/// Retrieval execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of sub-queries embedded and searched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

/// Prompt overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PromptConfig {
    /// Replaces the built-in system instructions when set
    #[serde(default)]
    pub system: Option<String>,
}

fn default_local_url() -> String {
    std::env::var("CASEGROUND_OLLAMA_URL")
        .unwrap_or_else(|_| "http://localhost:11434/api".to_string())
}

fn default_cloud_url() -> String {
    std::env::var("CASEGROUND_CLOUD_URL")
        .unwrap_or_else(|_| "https://api.anthropic.com".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("CASEGROUND_EMBEDDING_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string())
}

fn default_generation_model() -> String {
    std::env::var("CASEGROUND_GENERATION_MODEL").unwrap_or_else(|_| "qwen2.5:7b".to_string())
}

fn default_api_key() -> Option<String> {
    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
}

fn default_cloud_model() -> String {
    std::env::var("CASEGROUND_CLOUD_MODEL")
        .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string())
}

fn default_embed_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a specific path; a missing file yields defaults
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.local.url.trim().is_empty() {
            return Err(CasegroundError::Config("local.url must not be empty".into()));
        }
        if self.local.embedding_model.trim().is_empty() {
            return Err(CasegroundError::Config(
                "local.embedding_model must not be empty".into(),
            ));
        }
        if self.retrieval.concurrency == 0 {
            return Err(CasegroundError::Config(
                "retrieval.concurrency must be greater than zero".into(),
            ));
        }
        if self.cloud.max_tokens == 0 {
            return Err(CasegroundError::Config(
                "cloud.max_tokens must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
