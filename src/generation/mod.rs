// Text-generation collaborator boundary

pub mod ollama;

use crate::Result;
use async_trait::async_trait;

/// Output budget for a synthesized answer. Factual Q&A answers are short;
/// an unbounded response would mostly waste generation time.
pub const DEFAULT_MAX_TOKENS: u32 = 700;
/// Low temperature favors determinism over creativity for factual answers.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Synthesizes natural-language text from a prompt. Failures surface as
/// `QaError::Generator` or `QaError::GeneratorTimeout`.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}
