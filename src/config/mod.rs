#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "casegen.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub retriever: RetrieverConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in whitespace tokens.
    pub chunk_size: usize,
    /// Tokens shared between adjacent windows.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            overlap: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub batch_size: u32,
    /// Dimension of the hashing fallback vectorizer. The pretrained model
    /// dictates its own dimension.
    pub fallback_dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "nomic-embed-text:latest".to_string(),
            batch_size: 32,
            fallback_dimension: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub path: PathBuf,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("casegen.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrieverConfig {
    pub top_k: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    /// Path to the master prompt template. `{{placeholders}}` are filled
    /// from user input plus `{{retrieved_context}}`.
    pub template_path: Option<PathBuf>,
    pub max_context_snippets: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            max_context_snippets: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid top_k: {0} (must be at least 1)")]
    InvalidTopK(usize),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid port: {0}")]
    InvalidPort(u16),
    #[error("Invalid fallback dimension: {0} (must be between 64 and 4096)")]
    InvalidFallbackDimension(usize),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid max context snippets: {0} (must be at least 1)")]
    InvalidMaxContextSnippets(usize),
}

impl Config {
    /// Load configuration from `<config_dir>/casegen.toml`, falling back to
    /// defaults when no file exists.
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.base_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunking.chunk_size));
        }
        // overlap >= chunk_size is tolerated: the chunker clamps the window
        // step to 1 so forward progress is always guaranteed.

        self.embedding.validate()?;

        if self.retriever.top_k == 0 {
            return Err(ConfigError::InvalidTopK(self.retriever.top_k));
        }

        if self.prompt.max_context_snippets == 0 {
            return Err(ConfigError::InvalidMaxContextSnippets(
                self.prompt.max_context_snippets,
            ));
        }

        Ok(())
    }

    /// Resolve the vector store path relative to the config directory unless
    /// an absolute path was configured.
    #[inline]
    pub fn store_path(&self) -> PathBuf {
        if self.vector_store.path.is_absolute() {
            self.vector_store.path.clone()
        } else {
            self.base_dir.join(&self.vector_store.path)
        }
    }
}

impl EmbeddingConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if !(64..=4096).contains(&self.fallback_dimension) {
            return Err(ConfigError::InvalidFallbackDimension(
                self.fallback_dimension,
            ));
        }

        Ok(())
    }

    #[inline]
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

/// Print the active configuration as TOML.
#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load(get_config_dir()?)?;
    let content = toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
    println!("Configuration file: {}", config.base_dir.join(CONFIG_FILE_NAME).display());
    println!("{content}");
    Ok(())
}

/// Write the default configuration file if none exists yet.
#[inline]
pub fn init_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!("Configuration already exists: {}", config_path.display());
        return Ok(());
    }

    let config = Config {
        base_dir: config_dir,
        ..Config::default()
    };
    config.save()?;
    println!("Wrote default configuration: {}", config_path.display());
    Ok(())
}

/// Default configuration directory (`~/.config/casegen` on Linux).
#[inline]
pub fn get_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine user config directory")?;
    Ok(base.join("casegen"))
}
