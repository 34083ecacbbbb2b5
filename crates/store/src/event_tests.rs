use super::*;

fn ev(event_type: &str, ts_ms: u64) -> EventRecord {
    EventRecord::new(event_type, "runner", ts_ms)
}

#[test]
fn query_filters_by_type() {
    let events = vec![ev("step:start", 1), ev("step:end", 2)];
    let q = EventQuery { event_type: Some("step:end".into()), ..Default::default() };
    let out = q.apply(events.iter());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].event_type, "step:end");
}

#[test]
fn query_since_ms_is_inclusive() {
    let events = vec![ev("a", 10), ev("b", 20), ev("c", 30)];
    let q = EventQuery { since_ms: Some(20), ..Default::default() };
    let out = q.apply(events.iter());
    assert_eq!(out.iter().map(|e| e.event_type.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn limit_keeps_last_n_after_filtering() {
    let events: Vec<EventRecord> = (0..10).map(|i| ev("t", i)).collect();
    let q = EventQuery { limit: Some(3), ..Default::default() };
    let out = q.apply(events.iter());
    assert_eq!(out.iter().map(|e| e.ts_ms).collect::<Vec<_>>(), vec![7, 8, 9]);
}

#[test]
fn contains_matches_payload_or_type() {
    let e = ev("agent:line", 1).with_payload(serde_json::json!({"line": "hello world"}));
    let q = EventQuery { contains: Some("HELLO".into()), ..Default::default() };
    assert_eq!(q.apply(std::iter::once(&e)).len(), 1);
}
