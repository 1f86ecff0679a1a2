use super::*;

#[test]
fn short_text_not_truncated() {
    let text = "How do I use Tab completion?";
    assert_eq!(truncate_for_embedding(text), text);
}

#[test]
fn long_text_truncated_to_limit() {
    let text = "a".repeat(MAX_EMBED_INPUT_CHARS + 100);
    let truncated = truncate_for_embedding(&text);
    assert_eq!(truncated.chars().count(), MAX_EMBED_INPUT_CHARS);
}

#[test]
fn truncation_respects_char_boundaries() {
    let text = "é".repeat(MAX_EMBED_INPUT_CHARS + 10);
    let truncated = truncate_for_embedding(&text);
    assert_eq!(truncated.chars().count(), MAX_EMBED_INPUT_CHARS);
    assert!(text.is_char_boundary(truncated.len()));
}

#[test]
fn reduce_dimension_truncates_and_renormalizes() {
    let embedding = vec![3.0, 4.0, 100.0, 100.0];
    let reduced = reduce_dimension(embedding, 2);
    assert_eq!(reduced.len(), 2);

    let norm = reduced.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
    // Direction of the kept prefix is preserved
    assert!((reduced[0] - 0.6).abs() < 1e-5);
    assert!((reduced[1] - 0.8).abs() < 1e-5);
}

#[test]
fn reduce_dimension_noop_when_already_small() {
    let embedding = vec![0.1, 0.2];
    assert_eq!(reduce_dimension(embedding.clone(), 768), embedding);
}

#[test]
fn reduce_dimension_handles_zero_vector() {
    let reduced = reduce_dimension(vec![0.0; 10], 4);
    assert_eq!(reduced, vec![0.0; 4]);
}
