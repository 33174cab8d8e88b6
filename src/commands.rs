use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{error, info};

use crate::chunking::chunk_records;
use crate::config::Config;
use crate::embeddings::EmbeddingClient;
use crate::ingestion::{discover_artifacts, load_artifact};
use crate::retriever::Retriever;
use crate::store::VectorStore;
use crate::{CasegenError, Result};

/// Summary of one ingest run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub artifacts_processed: usize,
    pub artifacts_failed: usize,
    pub chunks_upserted: usize,
}

/// Ingest artifacts into the vector store: discover, load, chunk, embed,
/// and upsert in one pass. One artifact failing to load is logged and
/// skipped; its chunk-id namespace is per-artifact, so the failure cannot
/// disturb other artifacts' rows.
#[inline]
pub async fn ingest(
    config: &Config,
    paths: &[PathBuf],
    chunk_size: Option<usize>,
    overlap: Option<usize>,
) -> Result<IngestSummary> {
    let chunk_size = chunk_size.unwrap_or(config.chunking.chunk_size);
    let overlap = overlap.unwrap_or(config.chunking.overlap);
    if chunk_size == 0 {
        return Err(CasegenError::Validation(
            "chunk_size must be at least 1".to_string(),
        ));
    }

    let embedder = EmbeddingClient::new(&config.embedding)?;
    let store = VectorStore::open(config.store_path()).await?;

    // Close the store exactly once, error or not.
    let result = ingest_into(&store, &embedder, paths, chunk_size, overlap).await;
    store.close().await;
    result
}

async fn ingest_into(
    store: &VectorStore,
    embedder: &EmbeddingClient,
    paths: &[PathBuf],
    chunk_size: usize,
    overlap: usize,
) -> Result<IngestSummary> {
    let artifacts = discover_artifacts(paths)?;
    info!("Discovered {} artifacts", artifacts.len());

    let mut summary = IngestSummary::default();
    let mut all_chunks = Vec::new();

    for artifact in &artifacts {
        let records = match load_artifact(artifact) {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to load {}: {e}", artifact.display());
                summary.artifacts_failed += 1;
                continue;
            }
        };

        // The file stem namespaces chunk ids per artifact.
        let prefix = artifact
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chunk".to_string());

        let mut chunks = chunk_records(&records, chunk_size, overlap, Some(&prefix))?;
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = embedder.embed(&texts)?;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }

        summary.artifacts_processed += 1;
        all_chunks.extend(chunks);
    }

    store.upsert(&all_chunks).await?;
    summary.chunks_upserted = all_chunks.len();

    info!(
        "Ingested {} chunks from {} artifacts ({} failed)",
        summary.chunks_upserted, summary.artifacts_processed, summary.artifacts_failed
    );
    Ok(summary)
}

/// Run a retrieval query and print the ranked chunks.
#[inline]
pub async fn query(
    config: &Config,
    text: &str,
    top_k: Option<usize>,
    doc_type: Option<String>,
) -> Result<()> {
    let embedder = EmbeddingClient::new(&config.embedding)?;
    let store = VectorStore::open(config.store_path()).await?;
    let retriever = Retriever::new(embedder, store, config.retriever.top_k);

    let filters = doc_type.map(|doc_type| {
        BTreeMap::from([("doc_type".to_string(), doc_type)])
    });

    let result = retriever.retrieve(text, top_k, filters.as_ref()).await;
    retriever.close().await;
    let results = result?;

    if results.is_empty() {
        println!("No matching chunks.");
        return Ok(());
    }

    for (rank, scored) in results.iter().enumerate() {
        let metadata = &scored.chunk.metadata;
        println!(
            "{}. [{:.4}] {} ({})",
            rank + 1,
            scored.score,
            metadata.get("source").map(String::as_str).unwrap_or("unknown"),
            metadata
                .get("doc_type")
                .map(String::as_str)
                .unwrap_or("unknown"),
        );
        println!("   {}", preview(&scored.chunk.text, 200));
    }

    Ok(())
}

/// Delete chunks by id. Unknown ids are ignored.
#[inline]
pub async fn delete(config: &Config, ids: &[String]) -> Result<()> {
    let store = VectorStore::open(config.store_path()).await?;
    let result = store.delete(ids).await;
    store.close().await;
    result?;

    println!("Deleted {} ids (missing ids ignored).", ids.len());
    Ok(())
}

/// Print store location and row count.
#[inline]
pub async fn status(config: &Config) -> Result<()> {
    let path = config.store_path();
    let store = VectorStore::open(&path).await?;
    let result = store.count().await;
    store.close().await;
    let count = result?;

    println!("Vector store: {}", path.display());
    println!("Stored chunks: {count}");
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut preview: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        preview.push('…');
    }
    preview
}
