
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::config::SearchConfig;
use crate::embeddings::{Embedder, truncate_for_embedding};
use crate::store::{MetadataFilter, ScoredPassage, VectorStore};
use crate::{QaError, Result};

/// Per-call retrieval policy. Defaults come from `SearchConfig`; callers
/// may tighten them for a single query.
#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    pub match_threshold: f32,
    pub max_results: usize,
    pub filter: MetadataFilter,
}

impl RetrieveOptions {
    #[inline]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            match_threshold: config.search.match_threshold,
            max_results: config.search.max_context_passages,
            filter: MetadataFilter::default(),
        }
    }

    #[inline]
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Turns a query string into a ranked list of scored passages by
/// orchestrating the Embedder and the Vector Store.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    #[inline]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve passages relevant to `query`.
    ///
    /// Guarantees on the result: sorted descending by similarity, at most
    /// `max_results` entries, every similarity at or above the threshold.
    /// An empty result is a valid outcome, not an error. Provider failures
    /// propagate untouched; retries belong to the collaborators.
    #[inline]
    pub async fn retrieve(
        &self,
        query: &str,
        options: &RetrieveOptions,
    ) -> Result<Vec<ScoredPassage>> {
        if query.trim().is_empty() {
            return Err(QaError::InvalidQuery);
        }

        let text = truncate_for_embedding(query);
        let vector = self.embedder.embed(text).await?;

        let mut passages = self
            .store
            .similarity_search(
                &vector,
                options.match_threshold,
                options.max_results,
                &options.filter,
            )
            .await?;

        // The store already applies threshold and limit; enforce the
        // contract here too since this layer owns it.
        passages.retain(|p| p.similarity >= options.match_threshold);
        passages.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        passages.truncate(options.max_results);

        debug!(
            "Retrieved {} passages for query (threshold {})",
            passages.len(),
            options.match_threshold
        );
        Ok(passages)
    }
}
