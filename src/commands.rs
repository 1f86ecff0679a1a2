use anyhow::{Context, Result};
use console::style;
use std::sync::Arc;
use tracing::info;

use crate::analytics::TracingAnalytics;
use crate::config::SearchConfig;
use crate::embeddings::ollama::OllamaEmbedder;
use crate::generation::ollama::OllamaGenerator;
use crate::pipeline::{AnswerOptions, QaPipeline};
use crate::store::MetadataFilter;
use crate::store::lancedb::LanceVectorStore;

/// Answer a question against the indexed knowledge base and print the
/// result with its citations.
#[inline]
pub async fn ask(
    question: &str,
    max_sources: Option<usize>,
    source_kind: Option<String>,
    version: Option<String>,
) -> Result<()> {
    let config = SearchConfig::load().context("Failed to load configuration")?;
    info!("Answering question: {}", question);

    let embedder = Arc::new(OllamaEmbedder::new(&config)?);
    let store = Arc::new(
        LanceVectorStore::new(&config)
            .await
            .context("Failed to open knowledge base")?,
    );
    let generator = Arc::new(OllamaGenerator::new(&config)?);

    let pipeline = QaPipeline::new(
        config,
        embedder,
        store,
        generator,
        Arc::new(TracingAnalytics),
    );

    let options = AnswerOptions {
        max_sources,
        filter: MetadataFilter {
            source_kind,
            version,
        },
        ..AnswerOptions::default()
    };

    let result = pipeline
        .answer_question(question, &options)
        .await
        .context("Failed to answer question")?;

    println!("{}", result.answer);

    if !result.sources.is_empty() {
        println!();
        println!("{}", style("Sources:").bold());
        for source in &result.sources {
            println!(
                "  {} ({}): {}",
                style(&source.title).cyan(),
                source.url,
                source.snippet
            );
        }
    }

    if !result.related_questions.is_empty() {
        println!();
        println!("{}", style("Related questions:").bold());
        for question in &result.related_questions {
            println!("  - {}", question);
        }
    }

    println!();
    println!(
        "{}",
        style(format!("Answered in {}ms", result.response_time_ms)).dim()
    );

    Ok(())
}

/// Print the active configuration, after file loading and environment
/// overrides.
#[inline]
pub fn show_config() -> Result<()> {
    let config = SearchConfig::load()?;

    println!("{}", style("Active configuration").bold());
    println!(
        "  Ollama endpoint: {}://{}:{}",
        config.ollama.protocol, config.ollama.host, config.ollama.port
    );
    println!("  Embedding model: {}", config.ollama.embedding_model);
    println!("  Generation model: {}", config.ollama.generation_model);
    println!(
        "  Embedding mode: {:?} ({} dimensions)",
        config.search.embedding_mode,
        config.search.embedding_mode.dimension()
    );
    println!("  Match threshold: {}", config.search.match_threshold);
    println!("  Max sources: {}", config.search.max_sources);
    println!(
        "  Max context passages: {}",
        config.search.max_context_passages
    );
    println!("  Caching: {}", config.search.enable_caching);
    if config.search.enable_caching {
        println!(
            "  Cache timeout: {}s",
            config.search.cache_timeout_seconds
        );
    }
    println!(
        "  Knowledge base: {}",
        config.vector_database_path().display()
    );

    Ok(())
}
