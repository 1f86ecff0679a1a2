// Answer cache
// Memoizes full answers by normalized query and per-call options to avoid
// repeat provider calls.


use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::pipeline::{AnswerOptions, AnswerResult};

/// TTL cache of answered questions, shared across concurrent requests.
///
/// A write race between two requests for the same novel query is fine:
/// last writer wins, and freshness beyond TTL expiry is not a correctness
/// requirement.
pub struct AnswerCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

struct CacheEntry {
    result: AnswerResult,
    inserted_at: Instant,
}

/// Canonical cache key: case-folded with runs of whitespace collapsed, so
/// trivially different spellings of the same question share an entry.
#[inline]
pub fn normalize_key(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cache key for a full request: the normalized question plus every
/// per-call option that changes the answer. A filtered or history-bearing
/// request must never be served an entry computed under different
/// constraints.
#[inline]
pub fn request_key(query: &str, options: &AnswerOptions) -> String {
    let mut key = normalize_key(query);

    if let Some(kind) = &options.filter.source_kind {
        let _ = write!(key, "|kind:{}", kind);
    }
    if let Some(version) = &options.filter.version {
        let _ = write!(key, "|version:{}", version);
    }
    if let Some(max_sources) = options.max_sources {
        let _ = write!(key, "|sources:{}", max_sources);
    }
    if let Some(temperature) = options.temperature {
        let _ = write!(key, "|temp:{}", temperature);
    }
    for turn in &options.history {
        let _ = write!(key, "|{}:{}", turn.role.label(), turn.content);
    }

    key
}

impl AnswerCache {
    #[inline]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a fresh cached answer by its request key. Expired entries
    /// are evicted on read.
    #[inline]
    pub fn get(&self, key: &str) -> Option<AnswerResult> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        if let Some(entry) = entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                debug!("Cache hit for query");
                return Some(entry.result.clone());
            }
        }

        // Stale or absent; drop whatever is there
        entries.remove(key);
        None
    }

    #[inline]
    pub fn insert(&self, key: &str, result: &AnswerResult) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        // Opportunistic cleanup keeps the map from accumulating dead entries
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);

        entries.insert(
            key.to_string(),
            CacheEntry {
                result: result.clone(),
                inserted_at: Instant::now(),
            },
        );
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
