//! Gate facade tying configuration, the admission pool, and the tick driver
//! together.
//!
//! A [`RenderGate`] is one independent controller instance: it owns its pool
//! state and, under the batch policy, its tick driver. Multiple gates never
//! interfere with each other.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::{GateConfig, RuntimeKind};
use crate::core::batch::BatchScheduler;
use crate::core::error::GateError;
use crate::core::events::EventSink;
use crate::core::pool::{AdmissionPool, DrainMode, GateStats};
use crate::core::ticket::Ticket;

#[cfg(feature = "tokio-runtime")]
use crate::core::permit::{self, AdmissionPermit};
#[cfg(feature = "tokio-runtime")]
use crate::runtime::{Spawn, TokioSpawner};

/// Concurrency-limiting admission controller for gradually started work.
///
/// Constructed in one of two policies:
///
/// - **immediate**: `request_admission` admits synchronously while a slot is
///   free; each `report_completion` feeds the freed slot to exactly one
///   queued successor.
/// - **batch**: admission only happens on a periodic tick, which drains up
///   to `capacity` tickets and does not drain again until the whole batch
///   has reported completion.
///
/// Dropping the gate disposes it.
pub struct RenderGate {
    pool: Arc<AdmissionPool>,
    scheduler: Option<BatchScheduler>,
}

impl RenderGate {
    /// Immediate-policy gate admitting up to `capacity` units at once.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidConfig` if `capacity` is zero.
    pub fn immediate(capacity: usize) -> Result<Self, GateError> {
        Self::from_config(&GateConfig::immediate(capacity))
    }

    /// Batch-policy gate draining up to `capacity` tickets per `interval`,
    /// driven by a dedicated OS thread.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidConfig` if `capacity` or `interval` is zero.
    pub fn batch(capacity: usize, interval: Duration) -> Result<Self, GateError> {
        Self::from_config(&GateConfig::batch(capacity, interval))
    }

    /// Batch-policy gate whose tick loop is spawned through `spawner`.
    ///
    /// The tick loop uses tokio timers, so the spawner must execute futures
    /// on a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidConfig` if `capacity` or `interval` is zero.
    #[cfg(feature = "tokio-runtime")]
    pub fn batch_on<S: Spawn>(
        capacity: usize,
        interval: Duration,
        spawner: &S,
    ) -> Result<Self, GateError> {
        let config = GateConfig::batch(capacity, interval);
        config.validate().map_err(GateError::InvalidConfig)?;
        let pool = Self::pool_from(&config, None);
        let scheduler = BatchScheduler::tokio(Arc::clone(&pool), interval, spawner);
        Ok(Self::assembled(pool, Some(scheduler), &config))
    }

    /// Gate built from a configuration value.
    ///
    /// `interval_ms` present selects the batch policy, absent the immediate
    /// policy. A batch gate starts its tick driver here.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidConfig` if the configuration fails
    /// validation.
    ///
    /// # Panics
    ///
    /// Selecting [`RuntimeKind::Tokio`] panics when called outside a tokio
    /// runtime, matching `tokio::spawn`.
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        Self::build(config, None)
    }

    /// Build with an optional event sink installed. Used by the builders.
    pub(crate) fn build(
        config: &GateConfig,
        sink: Option<Box<dyn EventSink>>,
    ) -> Result<Self, GateError> {
        config.validate().map_err(GateError::InvalidConfig)?;
        let pool = Self::pool_from(config, sink);

        let scheduler = match config.interval() {
            None => None,
            Some(interval) => Some(match config.runtime {
                RuntimeKind::Thread => BatchScheduler::thread(Arc::clone(&pool), interval),
                #[cfg(feature = "tokio-runtime")]
                RuntimeKind::Tokio => {
                    BatchScheduler::tokio(Arc::clone(&pool), interval, &TokioSpawner::current())
                }
            }),
        };
        Ok(Self::assembled(pool, scheduler, config))
    }

    fn pool_from(config: &GateConfig, sink: Option<Box<dyn EventSink>>) -> Arc<AdmissionPool> {
        let gate_id = uuid::Uuid::new_v4().to_string();
        let sink = sink.map(|sink| Arc::new(Mutex::new(sink)));
        Arc::new(AdmissionPool::new(
            gate_id,
            config.capacity,
            config.mode(),
            sink,
        ))
    }

    fn assembled(
        pool: Arc<AdmissionPool>,
        scheduler: Option<BatchScheduler>,
        config: &GateConfig,
    ) -> Self {
        match config.interval() {
            Some(interval) => tracing::info!(
                "gate {} created: batch policy, capacity {}, interval {:?}",
                pool.gate_id(),
                config.capacity,
                interval
            ),
            None => tracing::info!(
                "gate {} created: immediate policy, capacity {}",
                pool.gate_id(),
                config.capacity
            ),
        }
        Self { pool, scheduler }
    }

    /// Request permission to run `action`.
    ///
    /// Under the immediate policy with a free slot, `action` runs on the
    /// caller's stack before this returns and canceling the returned ticket
    /// is a no-op. Otherwise the action is queued in FIFO order and the
    /// ticket can cancel it up to the moment it fires.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Disposed` once the gate has been disposed.
    pub fn request_admission(
        &self,
        action: impl FnOnce() + Send + 'static,
    ) -> Result<Ticket, GateError> {
        self.pool.request_admission(Box::new(action))
    }

    /// Report that one previously admitted unit has finished.
    ///
    /// Callers owe exactly one report per admission, including when the
    /// admitted work is abandoned; a missing report leaks the slot and an
    /// extra report is dropped with a warning. After disposal this is a
    /// silent no-op.
    pub fn report_completion(&self) {
        self.pool.report_completion();
    }

    /// Wait for admission and receive a permit that reports completion when
    /// released or dropped.
    ///
    /// Dropping the future before admission cancels the underlying ticket.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Disposed` if the gate is disposed before this
    /// waiter is admitted.
    #[cfg(feature = "tokio-runtime")]
    pub async fn acquire(&self) -> Result<AdmissionPermit, GateError> {
        permit::acquire(&self.pool).await
    }

    /// Identifier of this gate instance, unique per construction.
    pub fn id(&self) -> &str {
        self.pool.gate_id()
    }

    /// Maximum concurrently admitted units.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Reclaim policy this gate was built with.
    pub fn mode(&self) -> DrainMode {
        self.pool.mode()
    }

    /// Whether `dispose` has been called (or the gate dropped).
    pub fn is_disposed(&self) -> bool {
        self.pool.is_disposed()
    }

    /// Snapshot of the gate's counters.
    pub fn stats(&self) -> GateStats {
        self.pool.stats()
    }

    /// Tear the gate down: drop pending tickets, refuse further admissions,
    /// and stop the tick driver. Idempotent.
    pub fn dispose(&self) {
        if self.pool.dispose() {
            if let Some(scheduler) = &self.scheduler {
                scheduler.shutdown();
            }
            tracing::info!("gate {} disposed", self.pool.gate_id());
        }
    }
}

impl Drop for RenderGate {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for RenderGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGate")
            .field("id", &self.id())
            .field("capacity", &self.capacity())
            .field("mode", &self.mode())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
