
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::analytics::{AnalyticsSink, QueryEvent};
use crate::cache::{AnswerCache, request_key};
use crate::config::SearchConfig;
use crate::embeddings::Embedder;
use crate::generation::Generator;
use crate::retriever::{RetrieveOptions, Retriever};
use crate::snippet::Citation;
use crate::store::{MetadataFilter, VectorStore};
use crate::synthesizer::{AnswerSynthesizer, ChatTurn, SynthesisOptions, fallback_questions};
use crate::{QaError, Result};

/// Per-question options on the public entry point.
#[derive(Debug, Clone, Default)]
pub struct AnswerOptions {
    pub max_sources: Option<usize>,
    pub temperature: Option<f32>,
    pub filter: MetadataFilter,
    pub history: Vec<ChatTurn>,
}

/// The terminal artifact returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    /// Markdown answer text
    pub answer: String,
    pub sources: Vec<Citation>,
    pub related_questions: Vec<String>,
    /// Wall-clock latency of the whole call, retrieval included
    pub response_time_ms: u64,
}

/// Top-level question-answering pipeline: validate, consult the cache, then
/// Retrieve -> Synthesize strictly in sequence.
///
/// Apart from `InvalidQuery`, this never returns an error: every provider
/// failure is converted into a well-formed fallback `AnswerResult`, since
/// the consumer is an end-user chat surface with no exception-handling
/// story of its own.
pub struct QaPipeline {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    cache: Option<AnswerCache>,
    analytics: Arc<dyn AnalyticsSink>,
    config: SearchConfig,
}

impl QaPipeline {
    #[inline]
    pub fn new(
        config: SearchConfig,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        let cache = config
            .search
            .enable_caching
            .then(|| AnswerCache::new(Duration::from_secs(config.search.cache_timeout_seconds)));

        Self {
            retriever: Retriever::new(embedder, store),
            synthesizer: AnswerSynthesizer::new(generator, &config),
            cache,
            analytics,
            config,
        }
    }

    /// Answer a natural-language question with citations.
    ///
    /// Rejects empty questions with `QaError::InvalidQuery` before touching
    /// any collaborator; all other failures come back as a fallback answer.
    #[inline]
    pub async fn answer_question(
        &self,
        question: &str,
        options: &AnswerOptions,
    ) -> Result<AnswerResult> {
        let started = Instant::now();

        if question.trim().is_empty() {
            return Err(QaError::InvalidQuery);
        }

        // Per-call options change the answer, so they are part of the key
        let cache_key = request_key(question, options);

        if let Some(cache) = &self.cache {
            if let Some(mut hit) = cache.get(&cache_key) {
                hit.response_time_ms = elapsed_ms(started);
                self.analytics.record(QueryEvent::new(
                    question,
                    hit.sources.len(),
                    hit.response_time_ms,
                    true,
                ));
                return Ok(hit);
            }
        }

        let (result, result_count, cacheable) = match self.run_stages(question, options, started).await
        {
            Ok((result, count)) => (result, count, true),
            Err(QaError::InvalidQuery) => return Err(QaError::InvalidQuery),
            Err(error) => {
                warn!("Pipeline stage failed, returning fallback answer: {}", error);
                (fallback_result(&error, started), 0, false)
            }
        };

        if cacheable {
            if let Some(cache) = &self.cache {
                cache.insert(&cache_key, &result);
            }
        }

        self.analytics.record(QueryEvent::new(
            question,
            result_count,
            result.response_time_ms,
            false,
        ));
        Ok(result)
    }

    /// Retrieve then synthesize. The synthesizer's prompt depends on the
    /// full retrieval result set, so the stages never overlap.
    async fn run_stages(
        &self,
        question: &str,
        options: &AnswerOptions,
        started: Instant,
    ) -> Result<(AnswerResult, usize)> {
        let retrieve_options =
            RetrieveOptions::from_config(&self.config).with_filter(options.filter.clone());
        let passages = self.retriever.retrieve(question, &retrieve_options).await?;
        debug!("Retrieved {} passages", passages.len());

        let synthesis_options = SynthesisOptions {
            history: options.history.clone(),
            temperature: options.temperature,
            max_sources: options.max_sources,
        };
        let synthesized = self
            .synthesizer
            .synthesize(question, &passages, &synthesis_options)
            .await?;

        let result = AnswerResult {
            answer: synthesized.answer,
            sources: synthesized.sources,
            related_questions: synthesized.related_questions,
            response_time_ms: elapsed_ms(started),
        };
        Ok((result, passages.len()))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Convert a stage failure into a polite, category-specific answer. The
/// match is exhaustive on purpose: adding an error variant without deciding
/// its user-facing category is a compile error, not a silent
/// misclassification.
fn fallback_result(error: &QaError, started: Instant) -> AnswerResult {
    let answer = match error {
        QaError::Embedder(_) | QaError::VectorStore(_) => {
            "Documentation search is temporarily unavailable. \
             Please try again in a few minutes."
        }
        QaError::Generator(_) | QaError::GeneratorTimeout(_) => {
            "The AI answering service is temporarily unavailable. \
             Please try again in a few minutes."
        }
        // InvalidQuery is rejected before the stages run; the remaining
        // kinds have no friendlier story than a generic apology.
        QaError::InvalidQuery
        | QaError::Config(_)
        | QaError::Io(_)
        | QaError::Other(_) => {
            "Something went wrong while answering your question. \
             Please try again."
        }
    };

    AnswerResult {
        answer: answer.to_string(),
        sources: Vec::new(),
        related_questions: fallback_questions(),
        response_time_ms: elapsed_ms(started),
    }
}
