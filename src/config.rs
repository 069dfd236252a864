//! TOML configuration and the provider API key.
//!
//! Every section is optional; missing fields fall back to the defaults
//! below. The only secret, the OpenAI API key, is read from the
//! environment and never from the file.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the embedding/chat provider API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Config file picked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/faq.toml";

/// Environment file loaded at startup when present.
pub const DEFAULT_ENV_PATH: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("JustAnotherSampleBrew_FAQ.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dims: default_dims(),
            batch_size: default_batch_size(),
            timeout_secs: default_embedding_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}
fn default_dims() -> usize {
    1536
}
fn default_batch_size() -> usize {
    64
}
fn default_embedding_timeout_secs() -> u64 {
    30
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: default_temperature(),
            timeout_secs: default_chat_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_chat_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    crate::index::DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Business named in the system instruction.
    #[serde(default = "default_business_name")]
    pub business_name: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            business_name: default_business_name(),
        }
    }
}

fn default_business_name() -> String {
    "JustAnotherSampleBrew".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:80".to_string()
}

/// Parse and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Resolve the configuration for the binary.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is used
/// when present and built-in defaults otherwise.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_config(default_path)
            } else {
                tracing::info!(
                    "No config file at {}, using built-in defaults",
                    DEFAULT_CONFIG_PATH
                );
                Ok(Config::default())
            }
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.embedding.model.trim().is_empty() {
            bail!("embedding.model must not be empty");
        }
        if self.embedding.dims == 0 {
            bail!("embedding.dims must be > 0");
        }
        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be > 0");
        }
        if self.chat.model.trim().is_empty() {
            bail!("chat.model must not be empty");
        }
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            bail!("chat.temperature must be in [0.0, 2.0]");
        }
        if self.retrieval.top_k < 1 {
            bail!("retrieval.top_k must be >= 1");
        }
        Ok(())
    }

    /// Replace the host and/or port of `[server].bind`.
    ///
    /// IPv6 hosts are bracketed, so `--host ::` binds `[::]:<port>`.
    pub fn override_bind(&mut self, host: Option<&str>, port: Option<u16>) {
        if host.is_none() && port.is_none() {
            return;
        }
        let (current_host, current_port) = match self.server.bind.rsplit_once(':') {
            Some((h, p)) if !h.is_empty() && (!h.contains(':') || h.ends_with(']')) => {
                (h.to_string(), p.to_string())
            }
            _ => (self.server.bind.clone(), "80".to_string()),
        };
        let host = host.map(str::to_string).unwrap_or(current_host);
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host
        };
        let port = port.map(|p| p.to_string()).unwrap_or(current_port);
        self.server.bind = format!("{}:{}", host, port);
    }
}

/// Load `KEY=value` lines from the env file at `path` into the process
/// environment.
///
/// A missing file is not an error and returns `Ok(false)`. Variables already
/// set in the process environment keep their values.
pub fn load_env_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file: {}", path.display()))?;
    Ok(true)
}

/// Read the provider API key from [`API_KEY_ENV`].
///
/// Missing or empty keys are a startup failure.
pub fn api_key_from_env() -> Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!("{} environment variable not set", API_KEY_ENV),
    }
}
