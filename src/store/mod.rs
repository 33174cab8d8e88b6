
use std::collections::BTreeMap;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, warn};

use crate::chunking::DocumentChunk;
use crate::{CasegenError, Result};

/// Guards the cosine denominator so zero-norm vectors score 0 instead of
/// dividing by zero.
const SCORE_EPSILON: f64 = 1e-10;

/// A retrieved chunk together with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f64,
}

/// Persistent, file-backed vector store keyed by chunk id.
///
/// Owns exactly one connection pool, acquired at [`open`] and released by
/// [`close`]. A single logical writer is assumed; concurrent reads are safe.
///
/// [`open`]: VectorStore::open
/// [`close`]: VectorStore::close
#[derive(Debug, Clone)]
pub struct VectorStore {
    pool: Pool<Sqlite>,
}

impl VectorStore {
    /// Open (creating if missing) the store at the given path and apply
    /// schema migrations.
    #[inline]
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("src/store/migrations").run(&pool).await?;

        info!("Vector store opened at {}", path.as_ref().display());
        Ok(Self { pool })
    }

    /// Release the underlying connections. Safe to call once per store;
    /// queries after close fail with a persistence error.
    #[inline]
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert-or-replace the given chunks in one transaction. Every chunk
    /// must carry an embedding; re-upserting an existing id overwrites the
    /// row rather than duplicating it.
    #[inline]
    pub async fn upsert(&self, chunks: &[DocumentChunk]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for chunk in chunks {
            let embedding = chunk.embedding.as_ref().ok_or_else(|| {
                CasegenError::Validation(format!("Chunk {} is missing an embedding", chunk.id))
            })?;
            let blob = pack_embedding(embedding);
            let dimension = embedding.len() as i64;
            let metadata = serde_json::to_string(&chunk.metadata)?;

            sqlx::query(
                "INSERT INTO chunks (id, embedding, dimension, text, metadata)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     embedding = excluded.embedding,
                     dimension = excluded.dimension,
                     text = excluded.text,
                     metadata = excluded.metadata",
            )
            .bind(&chunk.id)
            .bind(blob)
            .bind(dimension)
            .bind(&chunk.text)
            .bind(metadata)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Upserted {} chunks", chunks.len());
        Ok(())
    }

    /// Rank stored chunks by cosine similarity to the query vector.
    ///
    /// `filters` is an exact-match conjunction over metadata keys, pushed
    /// down as JSON predicates (the `doc_type` key hits an expression
    /// index). Rows whose stored dimension disagrees with the decoded
    /// vector length or with the query dimension are skipped, not fatal.
    /// Returns at most `top_k`
    /// results in non-increasing score order; ties keep row order.
    #[inline]
    pub async fn similarity_search(
        &self,
        query: &[f64],
        top_k: usize,
        filters: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<ScoredChunk>> {
        let (clause, params) = filter_clause(filters)?;
        let sql =
            format!("SELECT id, embedding, dimension, text, metadata FROM chunks{clause}");

        let mut db_query = sqlx::query(&sql);
        for param in &params {
            db_query = db_query.bind(param);
        }
        let rows = db_query.fetch_all(&self.pool).await?;

        let mut scored = Vec::new();
        for row in rows {
            let Some(chunk) = decode_row(&row)? else {
                continue;
            };
            let embedding = chunk.embedding.as_deref().unwrap_or_default();
            if embedding.len() != query.len() {
                warn!(
                    "Skipping chunk {}: stored dimension {} does not match query dimension {}",
                    chunk.id,
                    embedding.len(),
                    query.len()
                );
                continue;
            }
            let score = cosine_similarity(query, embedding);
            scored.push(ScoredChunk { chunk, score });
        }

        // Stable sort keeps row order deterministic on tied scores.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Direct row lookup by chunk id.
    #[inline]
    pub async fn get(&self, id: &str) -> Result<Option<DocumentChunk>> {
        let row = sqlx::query("SELECT id, embedding, dimension, text, metadata FROM chunks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => decode_row(&row),
            None => Ok(None),
        }
    }

    /// Delete rows by id in one transaction. Missing ids are a no-op.
    #[inline]
    pub async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM chunks WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Total number of stored rows.
    #[inline]
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

/// Build the `WHERE` clause for a metadata filter conjunction. Keys are
/// interpolated into JSON paths and therefore restricted to identifier
/// characters; values are bound as parameters.
fn filter_clause(
    filters: Option<&BTreeMap<String, String>>,
) -> Result<(String, Vec<String>)> {
    let Some(filters) = filters.filter(|f| !f.is_empty()) else {
        return Ok((String::new(), Vec::new()));
    };

    let mut clauses = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for (key, value) in filters {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CasegenError::Validation(format!(
                "Invalid metadata filter key: {key:?}"
            )));
        }
        clauses.push(format!("json_extract(metadata, '$.{key}') = ?"));
        params.push(value.clone());
    }

    Ok((format!(" WHERE {}", clauses.join(" AND ")), params))
}

/// Decode a stored row, returning `None` when the dimension column
/// disagrees with the decoded vector (format drift is tolerated, not
/// fatal).
fn decode_row(row: &SqliteRow) -> Result<Option<DocumentChunk>> {
    let id: String = row.try_get("id")?;
    let blob: Vec<u8> = row.try_get("embedding")?;
    let dimension: i64 = row.try_get("dimension")?;
    let text: String = row.try_get("text")?;
    let metadata_json: String = row.try_get("metadata")?;

    let Some(embedding) = unpack_embedding(&blob) else {
        warn!("Skipping chunk {id}: embedding blob is not a whole number of floats");
        return Ok(None);
    };
    if embedding.len() as i64 != dimension {
        warn!(
            "Skipping chunk {id}: stored dimension {dimension} does not match vector length {}",
            embedding.len()
        );
        return Ok(None);
    }

    let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json)?;

    Ok(Some(DocumentChunk {
        id,
        text,
        metadata,
        embedding: Some(embedding),
    }))
}

/// Pack a vector as little-endian f64 bytes, `len * 8` bytes total.
fn pack_embedding(embedding: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 8);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Inverse of [`pack_embedding`]. Returns `None` when the blob length is
/// not a multiple of 8.
fn unpack_embedding(bytes: &[u8]) -> Option<Vec<f64>> {
    if bytes.len() % 8 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            })
            .collect(),
    )
}

/// Cosine similarity with an epsilon denominator so zero-norm vectors
/// never raise.
fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    dot / (norm_a * norm_b + SCORE_EPSILON)
}
