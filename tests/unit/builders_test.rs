//! Tests for builder modules

use render_gate::builders::{build_gate, build_gates, build_gates_with};
use render_gate::config::{GateConfig, GatesConfig};
use render_gate::core::{DrainMode, EventSink, GateError, InMemoryEventSink};
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_build_gate_from_config() {
    let gate = build_gate(&GateConfig::immediate(4)).unwrap();
    assert_eq!(gate.capacity(), 4);
    assert_eq!(gate.mode(), DrainMode::Immediate);
    assert!(!gate.is_disposed());
}

#[test]
fn test_build_gate_rejects_invalid_config() {
    let err = build_gate(&GateConfig::immediate(0)).unwrap_err();
    assert!(matches!(err, GateError::InvalidConfig(_)));
}

#[test]
fn test_build_gates_keyed_by_name() {
    let mut gates = HashMap::new();
    gates.insert("thumbnails".to_string(), GateConfig::immediate(8));
    gates.insert(
        "previews".to_string(),
        GateConfig::batch(2, Duration::from_millis(200)),
    );

    let built = build_gates(&GatesConfig { gates }).unwrap();
    assert_eq!(built.len(), 2);
    assert_eq!(built["thumbnails"].mode(), DrainMode::Immediate);
    assert_eq!(built["previews"].mode(), DrainMode::Batch);

    // Every gate gets its own identity.
    assert_ne!(built["thumbnails"].id(), built["previews"].id());
}

#[test]
fn test_build_gates_rejects_empty_config() {
    let cfg = GatesConfig {
        gates: HashMap::new(),
    };
    let err = build_gates(&cfg).unwrap_err();
    assert!(matches!(err, GateError::InvalidConfig(_)));
}

#[test]
fn test_build_gates_with_selective_sinks() {
    let mut gates = HashMap::new();
    gates.insert("thumbnails".to_string(), GateConfig::immediate(2));
    gates.insert("previews".to_string(), GateConfig::immediate(2));
    let cfg = GatesConfig { gates };

    let sink = InMemoryEventSink::new(16);
    let built = build_gates_with(&cfg, |name, _| {
        (name == "thumbnails").then(|| Box::new(sink.clone()) as Box<dyn EventSink>)
    })
    .unwrap();

    built["thumbnails"].request_admission(|| {}).unwrap();
    built["previews"].request_admission(|| {}).unwrap();

    // Only the instrumented gate recorded its admission.
    assert_eq!(sink.len(), 1);
}
