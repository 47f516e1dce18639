//! Builders to construct gates from configuration.

pub mod gate_builder;

pub use gate_builder::{build_gate, build_gate_with_events, build_gates, build_gates_with};
