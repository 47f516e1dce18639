//! Builders to construct gates from configuration.

use std::collections::HashMap;

use crate::config::{GateConfig, GatesConfig};
use crate::core::controller::RenderGate;
use crate::core::error::GateError;
use crate::core::events::EventSink;

/// Build one gate from its configuration.
///
/// # Errors
///
/// Returns `GateError::InvalidConfig` if the configuration fails validation.
pub fn build_gate(config: &GateConfig) -> Result<RenderGate, GateError> {
    RenderGate::build(config, None)
}

/// Build one gate with an event sink installed.
///
/// # Errors
///
/// Returns `GateError::InvalidConfig` if the configuration fails validation.
pub fn build_gate_with_events(
    config: &GateConfig,
    sink: Box<dyn EventSink>,
) -> Result<RenderGate, GateError> {
    RenderGate::build(config, Some(sink))
}

/// Build every configured gate, keyed by name.
///
/// # Errors
///
/// Returns `GateError::InvalidConfig` if any gate configuration fails
/// validation.
pub fn build_gates(cfg: &GatesConfig) -> Result<HashMap<String, RenderGate>, GateError> {
    build_gates_with(cfg, |_, _| None)
}

/// Build every configured gate, attaching the sink the factory returns for
/// each gate name.
///
/// # Errors
///
/// Returns `GateError::InvalidConfig` if any gate configuration fails
/// validation.
pub fn build_gates_with<F>(
    cfg: &GatesConfig,
    mut sink_factory: F,
) -> Result<HashMap<String, RenderGate>, GateError>
where
    F: FnMut(&str, &GateConfig) -> Option<Box<dyn EventSink>>,
{
    cfg.validate().map_err(GateError::InvalidConfig)?;

    let mut gates = HashMap::new();
    for (name, gate_cfg) in &cfg.gates {
        let gate = RenderGate::build(gate_cfg, sink_factory(name, gate_cfg))?;
        gates.insert(name.clone(), gate);
    }
    Ok(gates)
}
