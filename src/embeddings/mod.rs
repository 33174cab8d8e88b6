#[cfg(test)]
mod tests;

mod hashing;
mod ollama;

pub use hashing::HashingVectorizer;
pub use ollama::OllamaClient;

use tracing::{info, warn};

use crate::config::EmbeddingConfig;
use crate::{CasegenError, Result};

/// Embedding strategy, resolved exactly once at construction. The client
/// never falls back mid-session: a store populated by one backend keeps
/// being queried through the same backend for the client's lifetime.
#[derive(Debug)]
pub enum Backend {
    /// Pretrained sentence-embedding model served by Ollama.
    Pretrained(OllamaClient),
    /// Deterministic hashing bag-of-words vectorizer. Requires no network
    /// access and no model weights.
    Hashing(HashingVectorizer),
}

/// Maps chunk and query text to fixed-dimension vectors.
#[derive(Debug)]
pub struct EmbeddingClient {
    backend: Backend,
}

impl EmbeddingClient {
    /// Build a client, preferring the pretrained model when the Ollama
    /// server is reachable and serves the configured model, and otherwise
    /// settling on the hashing fallback.
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = OllamaClient::new(config).map_err(|e| CasegenError::Embedding(e.to_string()))?;

        match client.health_check() {
            Ok(()) => {
                info!("Using pretrained embedding model '{}'", config.model);
                Ok(Self {
                    backend: Backend::Pretrained(client),
                })
            }
            Err(e) => {
                warn!(
                    "Pretrained embedding model unavailable ({e:#}); \
                     using {}-dim hashing vectorizer",
                    config.fallback_dimension
                );
                Ok(Self {
                    backend: Backend::Hashing(HashingVectorizer::new(config.fallback_dimension)),
                })
            }
        }
    }

    /// Build a client from an explicit backend. Useful for injecting the
    /// hashing vectorizer where network access is undesirable.
    #[inline]
    pub fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self.backend, Backend::Hashing(_))
    }

    /// Embed a batch of texts. An empty input yields an empty output.
    #[inline]
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            Backend::Pretrained(client) => client
                .embed_batch(texts)
                .map_err(|e| CasegenError::Embedding(format!("{e:#}"))),
            Backend::Hashing(vectorizer) => {
                Ok(texts.iter().map(|text| vectorizer.vectorize(text)).collect())
            }
        }
    }

    /// Embed a query string. Exactly `embed([text])[0]`, so query vectors
    /// live in the same space as stored chunk vectors.
    #[inline]
    pub fn embed_query(&self, text: &str) -> Result<Vec<f64>> {
        self.embed(std::slice::from_ref(&text.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                CasegenError::Embedding("Backend returned no vector for query".to_string())
            })
    }
}
