//! Payload statistics at component boundaries.
//!
//! Counters are keyed by component location, survive across executions,
//! and count where the payload is actually consumed, independent of how
//! many spans observed the execution.

mod common;

use common::*;
use flowtrace::stats::{CountingIter, CountingRead, PayloadDirection, StatisticsRegistry};
use flowtrace::types::ComponentLocation;
use std::io::Read;
use std::sync::Arc;

// ============================================================================
// Stream counting
// ============================================================================

#[test]
fn bytes_count_once_for_a_stream_read_to_completion() {
    let registry = StatisticsRegistry::new(true);
    let location = ComponentLocation::flow("ingest").processor(0);
    let stats = registry.for_location(&location, "file:read");

    stats.add_invocation();
    let payload = vec![0xA5u8; 1343];
    let mut reader = CountingRead::new(
        std::io::Cursor::new(payload),
        Arc::clone(&stats),
        PayloadDirection::Input,
    );
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out.len(), 1343);
    assert_eq!(stats.input_bytes(), 1343);

    // The stream is exhausted; reading again adds nothing.
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(stats.input_bytes(), 1343);
    assert_eq!(stats.invocations(), 1);
}

#[test]
fn objects_count_as_the_iterator_is_consumed() {
    let registry = StatisticsRegistry::new(true);
    let location = ComponentLocation::flow("batch").processor(2);
    let stats = registry.for_location(&location, "batch:aggregate");

    let rows: Vec<u32> = (0..57).collect();
    let counted: Vec<u32> = CountingIter::new(
        rows.into_iter(),
        Arc::clone(&stats),
        PayloadDirection::Output,
    )
    .collect();
    assert_eq!(counted.len(), 57);
    assert_eq!(stats.output_objects(), 57);

    // A partially consumed iterator counts only what was pulled.
    let more: Vec<u32> = (0..100).collect();
    let _first_ten: Vec<u32> = CountingIter::new(
        more.into_iter(),
        Arc::clone(&stats),
        PayloadDirection::Output,
    )
    .take(10)
    .collect();
    assert_eq!(stats.output_objects(), 67);
}

#[test]
fn counting_is_independent_of_the_span_tree() {
    let rig = rig();
    let window = rig.sink.capture();
    let registry = StatisticsRegistry::new(true);
    let location = ComponentLocation::flow("ingest").processor(0);
    let stats = registry.for_location(&location, "file:read");

    // Several spans observe the execution; the payload is consumed once,
    // at the component that actually reads it.
    run_flow(
        &rig,
        "ingest",
        &[scope("demo", "custom-scope", vec![op("file", "read")])],
    );
    stats.add_invocation();
    let mut reader = CountingRead::new(
        std::io::Cursor::new(vec![1u8; 1343]),
        Arc::clone(&stats),
        PayloadDirection::Input,
    );
    std::io::copy(&mut reader, &mut std::io::sink()).unwrap();

    assert_eq!(window.exported_spans().len(), 4);
    assert_eq!(stats.input_bytes(), 1343);
    assert_eq!(stats.invocations(), 1);
}

// ============================================================================
// Registry behavior
// ============================================================================

#[test]
fn a_location_keeps_one_counter_set_across_executions() {
    let rig = rig();
    let registry = StatisticsRegistry::new(true);
    let location = ComponentLocation::flow("ingest").processor(0);

    for _ in 0..2 {
        let stats = registry.for_location(&location, "file:read");
        stats.add_invocation();
        run_flow(&rig, "ingest", &[op("file", "read")]);
    }

    let stats = registry.get("ingest/processors/0").unwrap();
    assert_eq!(stats.invocations(), 2);
    // Later lookups reuse the counters; the recorded component sticks.
    assert!(Arc::ptr_eq(
        &stats,
        &registry.for_location(&location, "renamed-later")
    ));
    assert_eq!(stats.component(), "file:read");
}

#[test]
fn a_disabled_registry_records_nothing() {
    let registry = StatisticsRegistry::new(false);
    let location = ComponentLocation::flow("ingest").processor(0);
    let stats = registry.for_location(&location, "file:read");
    assert!(!stats.enabled());

    stats.add_invocation();
    stats.add_bytes(PayloadDirection::Input, 4096);
    stats.add_objects(PayloadDirection::Output, 12);
    assert_eq!(stats.invocations(), 0);
    assert_eq!(stats.input_bytes(), 0);
    assert_eq!(stats.output_objects(), 0);

    // Wrapped consumption is a no-op as well.
    let mut reader = CountingRead::new(
        std::io::Cursor::new(vec![0u8; 128]),
        stats,
        PayloadDirection::Input,
    );
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(
        registry.get("ingest/processors/0").unwrap().input_bytes(),
        0
    );
}

#[test]
fn snapshot_lists_counters_sorted_by_location() {
    let registry = StatisticsRegistry::new(true);
    for index in [2usize, 0, 1] {
        let location = ComponentLocation::flow("ingest").processor(index);
        let _ = registry.for_location(&location, "demo:logger");
    }

    let snapshot = registry.snapshot();
    let locations: Vec<&str> = snapshot.iter().map(|s| s.location()).collect();
    assert_eq!(
        locations,
        [
            "ingest/processors/0",
            "ingest/processors/1",
            "ingest/processors/2",
        ]
    );
}
