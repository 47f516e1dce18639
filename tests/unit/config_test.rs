//! Tests for configuration validation

use render_gate::config::{GateConfig, GatesConfig, RuntimeKind};
use render_gate::core::DrainMode;
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_gate_config_validation() {
    assert!(GateConfig::immediate(8).validate().is_ok());
    assert!(GateConfig::batch(2, Duration::from_millis(250))
        .validate()
        .is_ok());
}

#[test]
fn test_gate_config_invalid_capacity() {
    let invalid = GateConfig::immediate(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_gate_config_invalid_interval() {
    let mut invalid = GateConfig::immediate(4);
    invalid.interval_ms = Some(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_interval_presence_selects_policy() {
    let immediate = GateConfig::immediate(4);
    assert_eq!(immediate.mode(), DrainMode::Immediate);
    assert!(immediate.interval().is_none());

    let batch = GateConfig::batch(2, Duration::from_millis(100));
    assert_eq!(batch.mode(), DrainMode::Batch);
    assert_eq!(batch.interval(), Some(Duration::from_millis(100)));
}

#[test]
fn test_host_parallelism_sizing() {
    let config = GateConfig::with_host_parallelism();
    assert!(config.capacity >= 1);
    assert_eq!(config.mode(), DrainMode::Immediate);
}

#[test]
fn test_gates_config_requires_one_gate() {
    let cfg = GatesConfig {
        gates: HashMap::new(),
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("at least one gate"));
}

#[test]
fn test_gates_config_names_invalid_member() {
    let mut gates = HashMap::new();
    gates.insert("thumbnails".to_string(), GateConfig::immediate(0));
    let cfg = GatesConfig { gates };

    let err = cfg.validate().unwrap_err();
    assert!(err.contains("thumbnails"));
    assert!(err.contains("capacity"));
}

#[test]
fn test_from_json_str_with_defaults() {
    let json = r#"{"gates": {"renders": {"capacity": 4}}}"#;
    let cfg = GatesConfig::from_json_str(json).unwrap();

    let gate = &cfg.gates["renders"];
    assert_eq!(gate.capacity, 4);
    assert!(gate.interval_ms.is_none());
    assert_eq!(gate.runtime, RuntimeKind::Thread);
    assert_eq!(gate.mode(), DrainMode::Immediate);
}

#[test]
fn test_from_json_str_batch_gate() {
    let json = r#"{"gates": {"previews": {"capacity": 2, "interval_ms": 250}}}"#;
    let cfg = GatesConfig::from_json_str(json).unwrap();

    let gate = &cfg.gates["previews"];
    assert_eq!(gate.mode(), DrainMode::Batch);
    assert_eq!(gate.interval(), Some(Duration::from_millis(250)));
}

#[test]
fn test_from_json_str_rejects_malformed() {
    let err = GatesConfig::from_json_str("{not json").unwrap_err();
    assert!(err.contains("parse error"));
}

#[test]
fn test_from_json_str_rejects_invalid_values() {
    let json = r#"{"gates": {"renders": {"capacity": 0}}}"#;
    assert!(GatesConfig::from_json_str(json).is_err());
}
