use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

/// Crate-wide error taxonomy.
///
/// Each external collaborator fails with its own variant so the pipeline can
/// classify failures by kind instead of sniffing message strings.
#[derive(Error, Debug)]
pub enum QaError {
    #[error("Query must not be empty")]
    InvalidQuery,

    #[error("Embedding service error: {0}")]
    Embedder(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Generation service error: {0}")]
    Generator(String),

    #[error("Generation timed out after {0:?}")]
    GeneratorTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod analytics;
pub mod cache;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod generation;
pub mod pipeline;
pub mod retriever;
pub mod snippet;
pub mod store;
pub mod synthesizer;
