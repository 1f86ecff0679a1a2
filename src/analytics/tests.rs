use super::*;
use std::sync::Mutex;

struct RecordingSink {
    events: Mutex<Vec<QueryEvent>>,
}

impl AnalyticsSink for RecordingSink {
    fn record(&self, event: QueryEvent) {
        self.events.lock().expect("lock").push(event);
    }
}

#[test]
fn event_carries_query_details() {
    let event = QueryEvent::new("How do I use tabs?", 3, 120, false);
    assert_eq!(event.query, "How do I use tabs?");
    assert_eq!(event.result_count, 3);
    assert_eq!(event.latency_ms, 120);
    assert!(!event.cache_hit);
    assert!(event.recorded_at <= Utc::now());
}

#[test]
fn recording_sink_captures_events() {
    let sink = RecordingSink {
        events: Mutex::new(Vec::new()),
    };
    sink.record(QueryEvent::new("q", 0, 5, true));
    sink.record(QueryEvent::new("q2", 2, 9, false));

    let events = sink.events.lock().expect("lock");
    assert_eq!(events.len(), 2);
    assert!(events[0].cache_hit);
}

#[test]
fn noop_sink_accepts_events() {
    NoopAnalytics.record(QueryEvent::new("q", 1, 1, false));
}
