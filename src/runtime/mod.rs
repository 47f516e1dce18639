//! Runtime adapters for driving gates from async hosts.

use std::future::Future;

#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;

#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning a gate's tick loop on an async runtime.
pub trait Spawn {
    /// Spawn an async task that runs a future to completion.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
