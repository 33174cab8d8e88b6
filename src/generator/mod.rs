
mod verifier;

pub use verifier::{JsonVerifier, VerificationResult, Verifier};

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use tracing::debug;

use crate::Result;
use crate::retriever::Retriever;
use crate::store::ScoredChunk;

/// Opaque generation boundary. The pipeline neither knows nor cares whether
/// the implementation is a local model, a remote API, or a test double.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Optional post-retrieval reordering stage.
pub trait Reranker {
    fn rerank(&self, chunks: Vec<ScoredChunk>) -> Vec<ScoredChunk>;
}

/// Default pass-through reranker.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityReranker;

impl Reranker for IdentityReranker {
    #[inline]
    fn rerank(&self, chunks: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        chunks
    }
}

/// Fills the master prompt template with user input and retrieved context.
///
/// Placeholders use `{{key}}` syntax; the assembled context block is bound
/// to `{{retrieved_context}}`.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    max_context_snippets: usize,
}

impl PromptBuilder {
    #[inline]
    pub fn new(template: impl Into<String>, max_context_snippets: usize) -> Self {
        Self {
            template: template.into(),
            max_context_snippets,
        }
    }

    #[inline]
    pub fn from_file(path: &Path, max_context_snippets: usize) -> Result<Self> {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template: {}", path.display()))?;
        Ok(Self::new(template, max_context_snippets))
    }

    #[inline]
    pub fn build(
        &self,
        user_input: &BTreeMap<String, String>,
        context_chunks: &[ScoredChunk],
    ) -> String {
        let context_block = self.context_block(context_chunks);

        let mut prompt = self.template.clone();
        for (key, value) in user_input {
            prompt = prompt.replace(&format!("{{{{{key}}}}}"), value);
        }
        prompt.replace("{{retrieved_context}}", &context_block)
    }

    fn context_block(&self, chunks: &[ScoredChunk]) -> String {
        if chunks.is_empty() {
            return "<context>No supporting documents retrieved.</context>".to_string();
        }

        chunks
            .iter()
            .take(self.max_context_snippets)
            .map(|scored| {
                let metadata = &scored.chunk.metadata;
                let source = metadata.get("source").map(String::as_str).unwrap_or("unknown");
                let doc_type = metadata
                    .get("doc_type")
                    .map(String::as_str)
                    .unwrap_or("unknown");
                format!(
                    "<context>\nsource: {source}\ndoc_type: {doc_type}\n{}\n</context>",
                    scored.chunk.text
                )
            })
            .join("\n\n")
    }
}

/// Everything produced by one generation request. Verification failures are
/// reported here rather than raised; callers inspect `passed`.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub prompt: String,
    pub raw_output: String,
    pub retrieved: Vec<ScoredChunk>,
    pub verification: Option<VerificationResult>,
}

/// End-to-end query path: retrieve supporting chunks, rerank, assemble the
/// prompt, generate, and optionally verify the output's structure.
pub struct TestCaseGenerator<G> {
    retriever: Retriever,
    prompt_builder: PromptBuilder,
    generator: G,
    reranker: Box<dyn Reranker + Send + Sync>,
    verifier: Option<Box<dyn Verifier + Send + Sync>>,
}

impl<G: Generator> TestCaseGenerator<G> {
    #[inline]
    pub fn new(retriever: Retriever, prompt_builder: PromptBuilder, generator: G) -> Self {
        Self {
            retriever,
            prompt_builder,
            generator,
            reranker: Box::new(IdentityReranker),
            verifier: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_reranker(mut self, reranker: Box<dyn Reranker + Send + Sync>) -> Self {
        self.reranker = reranker;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_verifier(mut self, verifier: Box<dyn Verifier + Send + Sync>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Run one generation request. The retrieval query prefers explicit
    /// `acceptance_criteria` text over the general `summary`.
    #[inline]
    pub async fn generate(
        &self,
        user_input: &BTreeMap<String, String>,
        filters: Option<&BTreeMap<String, String>>,
    ) -> Result<GenerationOutcome> {
        let query = user_input
            .get("acceptance_criteria")
            .or_else(|| user_input.get("summary"))
            .cloned()
            .unwrap_or_default();

        let retrieved = self.retriever.retrieve(&query, None, filters).await?;
        let reranked = self.reranker.rerank(retrieved);
        debug!("Building prompt from {} context chunks", reranked.len());

        let prompt = self.prompt_builder.build(user_input, &reranked);
        let raw_output = self.generator.generate(&prompt)?;
        let verification = self
            .verifier
            .as_ref()
            .map(|verifier| verifier.verify(&raw_output));

        Ok(GenerationOutcome {
            prompt,
            raw_output,
            retrieved: reranked,
            verification,
        })
    }

    /// Release the retriever's store connection exactly once.
    #[inline]
    pub async fn close(&self) {
        self.retriever.close().await;
    }
}
