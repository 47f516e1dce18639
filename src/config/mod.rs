//! Configuration models for gates and their tick drivers.

pub mod gate;

pub use gate::{GateConfig, GatesConfig, RuntimeKind};
