use super::*;
use crate::store::{ChunkMetadata, KnowledgeChunk};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

struct MockGenerator {
    calls: AtomicUsize,
    last_prompt: Mutex<Option<(String, String)>>,
}

impl MockGenerator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        *self.last_prompt.lock().expect("lock") =
            Some((system_prompt.to_string(), user_message.to_string()));
        Ok("Press Tab to complete commands.".to_string())
    }
}

fn passage(title: &str, text: &str, similarity: f32) -> ScoredPassage {
    ScoredPassage {
        chunk: KnowledgeChunk {
            id: title.to_lowercase().replace(' ', "-"),
            text: text.to_string(),
            metadata: ChunkMetadata {
                title: title.to_string(),
                url: Some("https://docs.example.com/reference".to_string()),
                category: None,
                version: None,
                source_kind: "tutorial".to_string(),
                quality_score: None,
            },
        },
        similarity,
    }
}

fn synthesizer(generator: Arc<MockGenerator>) -> AnswerSynthesizer {
    AnswerSynthesizer::new(generator, &SearchConfig::default())
}

#[tokio::test]
async fn empty_passages_short_circuit_without_generator() {
    let generator = MockGenerator::new();
    let synth = synthesizer(Arc::clone(&generator));

    let result = synth
        .synthesize("How does this work?", &[], &SynthesisOptions::default())
        .await
        .expect("fallback answer is not an error");

    assert_eq!(generator.calls.load(AtomicOrdering::SeqCst), 0);
    assert_eq!(result.answer, NO_RESULTS_ANSWER);
    assert!(result.sources.is_empty());
    assert_eq!(result.related_questions.len(), FALLBACK_QUESTIONS.len());
}

#[tokio::test]
async fn prompt_contains_all_titles_in_rank_order() {
    let generator = MockGenerator::new();
    let synth = synthesizer(Arc::clone(&generator));

    let passages = vec![
        passage("Tab Completion Basics", "Press Tab to complete.", 0.91),
        passage("Shell Shortcuts", "Shortcuts save time.", 0.85),
        passage("Command History", "Use the up arrow.", 0.40),
    ];

    synth
        .synthesize(
            "How do I use Tab completion?",
            &passages,
            &SynthesisOptions::default(),
        )
        .await
        .expect("synthesis should succeed");

    let (system, user) = generator
        .last_prompt
        .lock()
        .expect("lock")
        .clone()
        .expect("generator was called");

    assert_eq!(system, SYSTEM_PROMPT);
    let first = user.find("Tab Completion Basics").expect("first title");
    let second = user.find("Shell Shortcuts").expect("second title");
    let third = user.find("Command History").expect("third title");
    assert!(first < second && second < third);
    assert!(user.contains("Question: How do I use Tab completion?"));
}

#[tokio::test]
async fn sources_capped_independently_of_context() {
    let generator = MockGenerator::new();
    let mut config = SearchConfig::default();
    config.search.max_sources = 2;
    config.search.max_context_passages = 4;
    let synth = AnswerSynthesizer::new(Arc::clone(&generator) as Arc<dyn Generator>, &config);

    let passages: Vec<_> = (0..4)
        .map(|i| passage(&format!("Title {}", i), "Some passage text here.", 0.9))
        .collect();

    let result = synth
        .synthesize("question", &passages, &SynthesisOptions::default())
        .await
        .expect("synthesis should succeed");

    // All four passages went into the prompt, but only two citations
    let (_, user) = generator
        .last_prompt
        .lock()
        .expect("lock")
        .clone()
        .expect("generator was called");
    assert!(user.contains("Title 3"));
    assert_eq!(result.sources.len(), 2);
    assert_eq!(result.sources[0].title, "Title 0");
}

#[tokio::test]
async fn per_call_max_sources_override() {
    let generator = MockGenerator::new();
    let synth = synthesizer(Arc::clone(&generator));

    let passages: Vec<_> = (0..3)
        .map(|i| passage(&format!("Title {}", i), "Some passage text here.", 0.9))
        .collect();

    let options = SynthesisOptions {
        max_sources: Some(1),
        ..SynthesisOptions::default()
    };
    let result = synth
        .synthesize("question", &passages, &options)
        .await
        .expect("synthesis should succeed");
    assert_eq!(result.sources.len(), 1);
}

#[tokio::test]
async fn history_included_in_prompt() {
    let generator = MockGenerator::new();
    let synth = synthesizer(Arc::clone(&generator));

    let options = SynthesisOptions {
        history: vec![
            ChatTurn {
                role: ChatRole::User,
                content: "What is the shell?".to_string(),
            },
            ChatTurn {
                role: ChatRole::Assistant,
                content: "The shell is a command interpreter.".to_string(),
            },
        ],
        ..SynthesisOptions::default()
    };

    synth
        .synthesize(
            "And how do I complete commands?",
            &[passage("Tab Completion", "Press Tab.", 0.9)],
            &options,
        )
        .await
        .expect("synthesis should succeed");

    let (_, user) = generator
        .last_prompt
        .lock()
        .expect("lock")
        .clone()
        .expect("generator was called");
    assert!(user.contains("Conversation so far:"));
    assert!(user.contains("User: What is the shell?"));
    assert!(user.contains("Assistant: The shell is a command interpreter."));
}

#[test]
fn related_questions_bounded_and_deduped() {
    let questions = related_questions("How do I fix this error? What went wrong?");
    assert!(!questions.is_empty());
    assert!(questions.len() <= 3);

    let unique: std::collections::HashSet<_> = questions.iter().collect();
    assert_eq!(unique.len(), questions.len());
}

#[test]
fn related_questions_fall_back_to_static_pool() {
    let questions = related_questions("tab completion");
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0], FALLBACK_QUESTIONS[0]);
}
