// Citation snippets
// Pure transformation from a scored passage to a display-ready citation.

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::store::ScoredPassage;

/// Longest snippet shown in a citation, before the ellipsis.
pub const MAX_SNIPPET_CHARS: usize = 150;
/// Fragments shorter than this are headers or labels, not sentences.
const MIN_SENTENCE_CHARS: usize = 20;
/// Raw-text fallback length when no sentence qualifies.
const FALLBACK_SNIPPET_CHARS: usize = 120;

const DOCS_ROOT_PATH: &str = "/docs";
const TUTORIALS_LISTING_PATH: &str = "/tutorials";

/// Source reference shown alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Similarity rounded to two decimals for display
    pub relevance: f32,
}

/// Derive a citation from a retrieved passage. Deterministic and
/// side-effect free.
#[inline]
pub fn extract_citation(passage: &ScoredPassage) -> Citation {
    Citation {
        title: passage.chunk.metadata.title.clone(),
        url: normalize_url(passage.chunk.metadata.url.as_deref()),
        snippet: extract_snippet(&passage.chunk.text),
        relevance: (passage.similarity * 100.0).round() / 100.0,
    }
}

/// Pick a short, human-readable excerpt from passage text: the first
/// sentence-like unit of reasonable length, else the start of the raw text.
#[inline]
pub fn extract_snippet(text: &str) -> String {
    let chosen = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .find(|fragment| fragment.chars().count() >= MIN_SENTENCE_CHARS);

    match chosen {
        Some(sentence) => truncate_at_word(sentence, MAX_SNIPPET_CHARS),
        None => truncate_at_word(text.trim(), FALLBACK_SNIPPET_CHARS),
    }
}

/// Truncate to at most `max_chars` characters, backing up to the nearest
/// preceding whitespace so words are never cut mid-way, and appending an
/// ellipsis when anything was dropped.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => cut
            .get(..idx)
            .map_or_else(|| cut.clone(), |s| s.to_string()),
        _ => cut,
    };

    format!("{}...", trimmed.trim_end())
}

/// Resolve a stored URL to one that is safe to display. Deep links into the
/// tutorial hierarchy are not stable across content reorganizations, so they
/// collapse to the tutorials listing; a missing URL falls back to the docs
/// root.
#[inline]
pub fn normalize_url(url: Option<&str>) -> String {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return DOCS_ROOT_PATH.to_string();
    };

    let path = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .and_then(|rest| rest.find('/').and_then(|idx| rest.get(idx..)))
        .unwrap_or(url);

    if let Some(rest) = path.strip_prefix("/tutorials/") {
        if !rest.is_empty() {
            return TUTORIALS_LISTING_PATH.to_string();
        }
    }

    url.to_string()
}
