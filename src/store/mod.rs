// Vector store collaborator boundary
// Record types shared across the pipeline plus the similarity-search trait.

pub mod lancedb;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata stored alongside each knowledge chunk. Written by the ingestion
/// tooling; read-only on the serving path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Title of the page/document the chunk came from
    pub title: String,
    /// URL of the source page, if it has a stable one
    pub url: Option<String>,
    /// Content category (e.g. "getting-started")
    pub category: Option<String>,
    /// Product version the content documents
    pub version: Option<String>,
    /// Kind of source material (e.g. "tutorial", "faq", "reference")
    pub source_kind: String,
    /// Editorial quality score assigned at ingestion time
    pub quality_score: Option<f32>,
}

/// A record in the knowledge base: stable id, text content, and metadata.
/// The embedding vector itself stays inside the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk paired with its cosine similarity to the query vector.
/// Created transiently per query; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub chunk: KnowledgeChunk,
    pub similarity: f32,
}

/// Restricts a search to matching metadata. An empty filter means no
/// restriction, never "match nothing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    pub source_kind: Option<String>,
    pub version: Option<String>,
}

impl MetadataFilter {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source_kind.is_none() && self.version.is_none()
    }
}

/// Similarity search over stored `(id, text, metadata, vector)` records.
/// Failures surface as `QaError::VectorStore`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return up to `top_k` records closest to `vector` by cosine
    /// similarity, restricted to `similarity >= threshold` and to records
    /// matching `filter`.
    async fn similarity_search(
        &self,
        vector: &[f32],
        threshold: f32,
        top_k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredPassage>>;
}
