//! Gate and multi-gate configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::DrainMode;

/// Tick driver selection for batch gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeKind {
    /// Dedicated OS thread driving the tick loop.
    #[default]
    Thread,
    /// Tick loop spawned onto a tokio runtime.
    #[cfg(feature = "tokio-runtime")]
    Tokio,
}

/// Gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Maximum concurrently admitted units.
    pub capacity: usize,
    /// Tick period in milliseconds. Present selects the batch policy,
    /// absent the immediate policy.
    #[serde(default)]
    pub interval_ms: Option<u64>,
    /// Tick driver for batch gates. Ignored by immediate gates.
    #[serde(default)]
    pub runtime: RuntimeKind,
}

impl GateConfig {
    /// Immediate-policy configuration.
    pub fn immediate(capacity: usize) -> Self {
        Self {
            capacity,
            interval_ms: None,
            runtime: RuntimeKind::default(),
        }
    }

    /// Batch-policy configuration with the default thread driver.
    ///
    /// `interval` is truncated to whole milliseconds.
    pub fn batch(capacity: usize, interval: Duration) -> Self {
        Self {
            capacity,
            interval_ms: Some(u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)),
            runtime: RuntimeKind::default(),
        }
    }

    /// Immediate-policy configuration sized to the host's logical CPU count.
    pub fn with_host_parallelism() -> Self {
        Self::immediate(num_cpus::get())
    }

    /// Reclaim policy selected by this configuration.
    pub fn mode(&self) -> DrainMode {
        if self.interval_ms.is_some() {
            DrainMode::Batch
        } else {
            DrainMode::Immediate
        }
    }

    /// Tick period, if the batch policy is selected.
    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.interval_ms == Some(0) {
            return Err("interval_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root configuration mapping gate names to their settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatesConfig {
    /// Map of gate name to configuration.
    pub gates: HashMap<String, GateConfig>,
}

impl GatesConfig {
    /// Validate all gates and ensure at least one gate exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.gates.is_empty() {
            return Err("at least one gate must be defined".into());
        }
        for (name, gate) in &self.gates {
            gate.validate()
                .map_err(|e| format!("gate `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse gate configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: GatesConfig =
            serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
