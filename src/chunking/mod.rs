#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::ingestion::ArtifactRecord;
use crate::{CasegenError, Result};

/// A bounded window of record text, the unit of embedding and storage.
///
/// The id is a pure function of `(prefix, source, index, leading text)`, so
/// re-ingesting identical input reproduces identical ids and upserts replace
/// rather than duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    pub embedding: Option<Vec<f64>>,
}

impl DocumentChunk {
    #[inline]
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Split text into overlapping windows of whitespace tokens, each rejoined
/// with single spaces. The window step is `chunk_size - overlap`, clamped to
/// a minimum of 1 so degenerate overlap values still make forward progress.
/// Empty or whitespace-only text yields no windows.
#[inline]
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(CasegenError::Validation(
            "chunk_size must be at least 1".to_string(),
        ));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(words.len());
        windows.push(words[start..end].join(" "));
        // Once a window reaches the last token, any further window would be
        // a suffix of it.
        if end == words.len() {
            break;
        }
        start += step;
    }

    Ok(windows)
}

/// Chunk artifact records into [`DocumentChunk`]s. Windows never span two
/// records; each chunk inherits its record's metadata plus a zero-based
/// `chunk_index`. The `prefix` namespaces ids per artifact so distinct
/// artifacts cannot collide.
#[inline]
pub fn chunk_records(
    records: &[ArtifactRecord],
    chunk_size: usize,
    overlap: usize,
    prefix: Option<&str>,
) -> Result<Vec<DocumentChunk>> {
    let prefix = prefix.unwrap_or("chunk");

    let mut chunks = Vec::new();
    for record in records {
        let source = record
            .metadata
            .get("source")
            .map(String::as_str)
            .unwrap_or_default();

        for (index, text) in chunk_text(&record.text, chunk_size, overlap)?
            .into_iter()
            .enumerate()
        {
            let id = chunk_id(prefix, source, index, &text);
            let mut metadata = record.metadata.clone();
            metadata.insert("chunk_index".to_string(), index.to_string());
            chunks.push(DocumentChunk {
                id,
                text,
                metadata,
                embedding: None,
            });
        }
    }

    debug!(
        "Chunked {} records into {} chunks (size {}, overlap {})",
        records.len(),
        chunks.len(),
        chunk_size,
        overlap
    );
    Ok(chunks)
}

/// Deterministic content-addressed chunk id: the hex SHA-256 digest of the
/// prefix, source, window index, and the first 32 characters of the window.
fn chunk_id(prefix: &str, source: &str, index: usize, text: &str) -> String {
    let leading: String = text.chars().take(32).collect();
    let material = format!("{prefix}-{source}-{index}-{leading}");
    hex::encode(Sha256::digest(material.as_bytes()))
}
