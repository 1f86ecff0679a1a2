#[cfg(test)]
mod tests;

use itertools::Itertools;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::config::SearchConfig;
use crate::generation::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, Generator};
use crate::snippet::{Citation, extract_citation};
use crate::store::ScoredPassage;

/// Instruction block sent with every generation request. Keeping a single
/// copy here is deliberate: the simple and conversational paths share it, so
/// citation and formatting rules cannot drift apart.
const SYSTEM_PROMPT: &str = "\
You are a documentation assistant. Answer the user's question using only the \
provided sources. Be concise and factual, format the answer as Markdown, and \
reference sources by their titles where relevant. If the sources do not \
contain the answer, say so plainly instead of guessing.";

/// Returned without invoking the generator when retrieval found nothing.
/// Never let the generator answer with zero grounding context.
const NO_RESULTS_ANSWER: &str = "\
I couldn't find anything in the documentation that answers your question. \
Try rephrasing it, or browse the tutorials for an overview of what's covered.";

const FALLBACK_QUESTIONS: [&str; 3] = [
    "What topics does the documentation cover?",
    "How do I get started?",
    "Where can I find the tutorials?",
];

/// Static follow-up suggestions, shared with the orchestrator's error
/// fallback path.
pub(crate) fn fallback_questions() -> Vec<String> {
    FALLBACK_QUESTIONS.iter().map(|q| (*q).to_string()).collect()
}

/// One prior exchange in a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// Per-call overrides for synthesis. Defaults come from `SearchConfig`.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    /// Prior conversation turns; empty for a one-shot question
    pub history: Vec<ChatTurn>,
    pub temperature: Option<f32>,
    pub max_sources: Option<usize>,
}

/// Output of the synthesis stage, before the orchestrator stamps timing on.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAnswer {
    pub answer: String,
    pub sources: Vec<Citation>,
    pub related_questions: Vec<String>,
}

/// Builds the generation prompt from retrieved passages and invokes the
/// Generator; assembles the final answer with citations and follow-ups.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    max_sources: usize,
    max_context_passages: usize,
}

impl AnswerSynthesizer {
    #[inline]
    pub fn new(generator: Arc<dyn Generator>, config: &SearchConfig) -> Self {
        Self {
            generator,
            max_sources: config.search.max_sources,
            max_context_passages: config.search.max_context_passages,
        }
    }

    /// Synthesize an answer to `question` grounded in `passages`.
    ///
    /// With no passages this short-circuits to a fixed not-found answer and
    /// never calls the Generator. Passages are assumed to arrive in
    /// retrieval rank order; the prompt preserves that order since
    /// generators weight earlier context more heavily.
    #[inline]
    pub async fn synthesize(
        &self,
        question: &str,
        passages: &[ScoredPassage],
        options: &SynthesisOptions,
    ) -> Result<SynthesizedAnswer> {
        if passages.is_empty() {
            debug!("No relevant passages; returning fixed fallback answer");
            return Ok(SynthesizedAnswer {
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                related_questions: fallback_questions(),
            });
        }

        let context_passages = &passages[..passages.len().min(self.max_context_passages)];
        let user_message = build_user_message(question, context_passages, &options.history);

        let answer = self
            .generator
            .generate(
                SYSTEM_PROMPT,
                &user_message,
                DEFAULT_MAX_TOKENS,
                options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            )
            .await?;

        // Citation count is capped independently of how much context the
        // generator saw.
        let source_cap = options.max_sources.unwrap_or(self.max_sources);
        let sources = passages
            .iter()
            .take(source_cap)
            .map(extract_citation)
            .collect();

        Ok(SynthesizedAnswer {
            answer,
            sources,
            related_questions: related_questions(question),
        })
    }
}

/// Assemble the user message: optional conversation history, a delimited
/// context block per source in rank order, then the question.
fn build_user_message(
    question: &str,
    passages: &[ScoredPassage],
    history: &[ChatTurn],
) -> String {
    let mut message = String::new();

    if !history.is_empty() {
        message.push_str("Conversation so far:\n");
        for turn in history {
            let _ = writeln!(message, "{}: {}", turn.role.label(), turn.content);
        }
        message.push('\n');
    }

    let context = passages
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "### Source {}: {}\n{}",
                i + 1,
                p.chunk.metadata.title,
                p.chunk.text
            )
        })
        .join("\n\n---\n\n");

    let _ = write!(
        message,
        "Sources:\n\n{}\n\nQuestion: {}",
        context, question
    );
    message
}

/// Suggest follow-up questions. These are navigational aids, not factual
/// claims: a static pool nudged by keywords in the question, deliberately
/// not grounded in the corpus.
fn related_questions(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    let mut suggestions = Vec::new();

    if lowered.contains("how") {
        suggestions.push("What are common mistakes to avoid here?".to_string());
    }
    if lowered.contains("what") {
        suggestions.push("How do I put this into practice?".to_string());
    }
    if lowered.contains("error") || lowered.contains("fail") {
        suggestions.push("How do I troubleshoot common errors?".to_string());
    }

    suggestions.extend(FALLBACK_QUESTIONS.iter().map(|q| (*q).to_string()));
    suggestions.into_iter().unique().take(3).collect()
}
