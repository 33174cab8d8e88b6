use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasegenError>;

#[derive(Error, Debug)]
pub enum CasegenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No adapter registered for artifact: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chunking;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod evaluation;
pub mod generator;
pub mod ingestion;
pub mod retriever;
pub mod store;
