
use std::collections::BTreeMap;

use tracing::debug;

use crate::Result;
use crate::embeddings::EmbeddingClient;
use crate::store::{ScoredChunk, VectorStore};

/// Answers "most relevant chunks for this query" by composing the embedder
/// and the vector store. Stateless across calls beyond the handles it owns;
/// safe to call repeatedly for read-only queries.
#[derive(Debug)]
pub struct Retriever {
    embedder: EmbeddingClient,
    store: VectorStore,
    default_top_k: usize,
}

impl Retriever {
    #[inline]
    pub fn new(embedder: EmbeddingClient, store: VectorStore, default_top_k: usize) -> Self {
        Self {
            embedder,
            store,
            default_top_k,
        }
    }

    /// Embed the query and rank stored chunks against it. `top_k` falls
    /// back to the configured default when not supplied per call.
    #[inline]
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
        filters: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<ScoredChunk>> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        let query_embedding = self.embedder.embed_query(query)?;

        let results = self
            .store
            .similarity_search(&query_embedding, top_k, filters)
            .await?;
        debug!("Retrieved {} chunks for query (top_k {top_k})", results.len());
        Ok(results)
    }

    #[inline]
    pub fn embedder(&self) -> &EmbeddingClient {
        &self.embedder
    }

    #[inline]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Release the store connection. Must be called exactly once when the
    /// retriever is finished, including on error paths.
    #[inline]
    pub async fn close(&self) {
        self.store.close().await;
    }
}
