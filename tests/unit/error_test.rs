//! Tests for error types

use render_gate::core::GateError;

#[test]
fn test_invalid_config_error() {
    let err = GateError::InvalidConfig("capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: capacity must be greater than 0"
    );
}

#[test]
fn test_disposed_error() {
    let err = GateError::Disposed;
    assert_eq!(format!("{}", err), "gate disposed");
}
