use super::*;
use crate::store::{ChunkMetadata, KnowledgeChunk, ScoredPassage};

fn passage_with(text: &str, url: Option<&str>, similarity: f32) -> ScoredPassage {
    ScoredPassage {
        chunk: KnowledgeChunk {
            id: "chunk-1".to_string(),
            text: text.to_string(),
            metadata: ChunkMetadata {
                title: "Tab Completion".to_string(),
                url: url.map(str::to_string),
                category: None,
                version: None,
                source_kind: "tutorial".to_string(),
                quality_score: None,
            },
        },
        similarity,
    }
}

#[test]
fn picks_first_qualifying_sentence() {
    let text = "Intro. Tab completion lets you finish commands quickly by pressing Tab. \
                A second sentence follows.";
    let snippet = extract_snippet(text);
    assert_eq!(
        snippet,
        "Tab completion lets you finish commands quickly by pressing Tab"
    );
}

#[test]
fn skips_short_fragments() {
    // "Usage" and "Step 1" look like headers, not sentences
    let text = "Usage. Step 1! This fragment is long enough to stand as a real sentence.";
    let snippet = extract_snippet(text);
    assert!(snippet.starts_with("This fragment is long enough"));
}

#[test]
fn falls_back_to_raw_text_when_no_sentence_qualifies() {
    let text = "short. tiny. words. only. here.";
    let snippet = extract_snippet(text);
    assert!(snippet.starts_with("short. tiny."));
}

#[test]
fn snippet_length_bounded() {
    let word = "documentation ";
    let text = word.repeat(50);
    let snippet = extract_snippet(&text);
    assert!(snippet.chars().count() <= MAX_SNIPPET_CHARS + 3);
    assert!(snippet.ends_with("..."));
}

#[test]
fn truncation_never_cuts_mid_word() {
    let text = "alpha bravo charlie ".repeat(20);
    let snippet = extract_snippet(&text);

    let body = snippet.trim_end_matches("...");
    // The last word of the truncated snippet must be a complete word
    let last_word = body.split_whitespace().last().expect("non-empty snippet");
    assert!(["alpha", "bravo", "charlie"].contains(&last_word));
}

#[test]
fn short_text_untouched() {
    assert_eq!(
        truncate_at_word("a short sentence", MAX_SNIPPET_CHARS),
        "a short sentence"
    );
}

#[test]
fn tutorial_deep_links_collapse_to_listing() {
    assert_eq!(
        normalize_url(Some("/tutorials/advanced/tab-completion")),
        "/tutorials"
    );
    assert_eq!(
        normalize_url(Some("https://docs.example.com/tutorials/intro")),
        "/tutorials"
    );
}

#[test]
fn tutorials_listing_itself_kept() {
    assert_eq!(normalize_url(Some("/tutorials")), "/tutorials");
}

#[test]
fn stable_urls_kept() {
    assert_eq!(
        normalize_url(Some("https://docs.example.com/reference/cli")),
        "https://docs.example.com/reference/cli"
    );
}

#[test]
fn missing_url_defaults_to_docs_root() {
    assert_eq!(normalize_url(None), "/docs");
    assert_eq!(normalize_url(Some("   ")), "/docs");
}

#[test]
fn citation_carries_rounded_relevance() {
    let passage = passage_with(
        "Tab completion lets you finish commands quickly by pressing Tab.",
        Some("https://docs.example.com/reference/cli"),
        0.9137,
    );
    let citation = extract_citation(&passage);
    assert_eq!(citation.title, "Tab Completion");
    assert_eq!(citation.url, "https://docs.example.com/reference/cli");
    assert_eq!(citation.relevance, 0.91);
    assert!(!citation.snippet.is_empty());
}
