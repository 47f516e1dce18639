//! Tests for admission event recording

use render_gate::builders::build_gate_with_events;
use render_gate::config::GateConfig;
use render_gate::core::{GateEvent, InMemoryEventSink};
use std::time::Duration;

#[test]
fn test_immediate_gate_records_lifecycle() {
    let sink = InMemoryEventSink::new(64);
    let gate =
        build_gate_with_events(&GateConfig::immediate(1), Box::new(sink.clone())).unwrap();

    gate.request_admission(|| {}).unwrap();
    let ticket_b = gate.request_admission(|| {}).unwrap();
    ticket_b.cancel();
    let ticket_c = gate.request_admission(|| {}).unwrap();
    gate.report_completion();
    gate.dispose();

    let events = sink.events();
    assert_eq!(events.len(), 7);
    assert!(matches!(events[0], GateEvent::AdmittedImmediately { .. }));
    assert_eq!(events[1], GateEvent::Enqueued { ticket: ticket_b.id() });
    assert_eq!(events[2], GateEvent::Enqueued { ticket: ticket_c.id() });
    assert_eq!(events[3], GateEvent::Completed);
    assert_eq!(
        events[4],
        GateEvent::SkippedCanceled { ticket: ticket_b.id() }
    );
    assert_eq!(events[5], GateEvent::Fired { ticket: ticket_c.id() });
    assert_eq!(events[6], GateEvent::Disposed { dropped: 0 });
}

#[test]
fn test_batch_gate_records_drain_size() {
    let sink = InMemoryEventSink::new(64);
    let gate = build_gate_with_events(
        &GateConfig::batch(2, Duration::from_millis(30)),
        Box::new(sink.clone()),
    )
    .unwrap();

    gate.request_admission(|| {}).unwrap();
    gate.request_admission(|| {}).unwrap();
    gate.request_admission(|| {}).unwrap();

    std::thread::sleep(Duration::from_millis(100));
    assert!(sink
        .events()
        .iter()
        .any(|event| *event == GateEvent::Drained { fired: 2 }));

    gate.report_completion();
    gate.report_completion();
    std::thread::sleep(Duration::from_millis(100));
    assert!(sink
        .events()
        .iter()
        .any(|event| *event == GateEvent::Drained { fired: 1 }));

    gate.report_completion();
}

#[test]
fn test_disposal_reports_dropped_count() {
    let sink = InMemoryEventSink::new(16);
    let gate =
        build_gate_with_events(&GateConfig::immediate(1), Box::new(sink.clone())).unwrap();

    gate.request_admission(|| {}).unwrap();
    gate.request_admission(|| {}).unwrap();
    gate.request_admission(|| {}).unwrap();
    gate.dispose();

    let events = sink.events();
    assert_eq!(events.last(), Some(&GateEvent::Disposed { dropped: 2 }));
}
