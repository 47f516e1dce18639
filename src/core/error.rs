//! Error types for admission-control operations.

use thiserror::Error;

/// Errors produced by gate components.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The controller has been disposed and accepts no new admissions.
    #[error("gate disposed")]
    Disposed,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
