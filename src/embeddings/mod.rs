// Embedding collaborator boundary
// The pipeline only sees the Embedder trait; providers live in submodules.

#[cfg(test)]
mod tests;

pub mod ollama;

use crate::Result;
use async_trait::async_trait;

/// Maximum input length accepted by the embedding providers. Longer queries
/// are truncated by the caller rather than rejected, since real questions
/// rarely come close to this limit.
pub const MAX_EMBED_INPUT_CHARS: usize = 8192;

/// Maps a text string to a fixed-length vector. A pure function from the
/// pipeline's perspective; failures surface as `QaError::Embedder`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Truncate text to the embedding input limit on a char boundary.
#[inline]
pub fn truncate_for_embedding(text: &str) -> &str {
    match text.char_indices().nth(MAX_EMBED_INPUT_CHARS) {
        Some((byte_idx, _)) => text.get(..byte_idx).unwrap_or(text),
        None => text,
    }
}

/// Reduce a Matryoshka-trained embedding to `target_dim` by truncating and
/// re-normalizing. Returns the vector unchanged when it is already at or
/// below the target dimension.
#[inline]
pub fn reduce_dimension(mut embedding: Vec<f32>, target_dim: usize) -> Vec<f32> {
    if embedding.len() <= target_dim {
        return embedding;
    }

    embedding.truncate(target_dim);
    let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut embedding {
            *value /= norm;
        }
    }
    embedding
}
