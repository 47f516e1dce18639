//! Periodic tick drivers for the batch reclaim policy.
//!
//! A [`BatchScheduler`] owns exactly one tick loop. Each pass sleeps for the
//! configured interval, drains the pool once, fires the drained actions, then
//! blocks until the whole batch has reported completion before arming the
//! next tick. Two drivers are provided:
//!
//! - a dedicated OS thread using a blocking `recv_timeout` sleep that a
//!   shutdown message (or dropping the sender) interrupts;
//! - a task spawned onto a tokio runtime, which performs the batch-done
//!   condvar wait on the blocking pool so runtime workers stay free.
//!
//! The driver never joins its loop on shutdown: `shutdown` may be called from
//! inside an admitted action, which on the thread driver would be a self-join.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::core::pool::AdmissionPool;
use crate::core::ticket::Action;

#[cfg(feature = "tokio-runtime")]
use crate::runtime::Spawn;

/// Handle held by the scheduler to stop its tick loop.
enum TickDriver {
    /// Dedicated OS thread. Dropping the sender unblocks the loop naturally.
    Thread {
        shutdown_tx: Mutex<Option<Sender<()>>>,
    },
    /// Detached tokio task signaled through a `Notify`.
    #[cfg(feature = "tokio-runtime")]
    Tokio { shutdown: Arc<tokio::sync::Notify> },
}

/// Fixed-interval driver that drains the pool in whole batches.
pub(crate) struct BatchScheduler {
    pool: Arc<AdmissionPool>,
    driver: TickDriver,
}

impl BatchScheduler {
    /// Start a tick loop on a dedicated OS thread.
    pub(crate) fn thread(pool: Arc<AdmissionPool>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let tick_pool = Arc::clone(&pool);
        thread::Builder::new()
            .name(format!("gate-tick-{}", pool.gate_id()))
            .spawn(move || tick_thread_loop(&tick_pool, interval, &shutdown_rx))
            .expect("failed to spawn batch tick thread");

        Self {
            pool,
            driver: TickDriver::Thread {
                shutdown_tx: Mutex::new(Some(shutdown_tx)),
            },
        }
    }

    /// Spawn the tick loop onto an async runtime via `spawner`.
    ///
    /// The loop future uses tokio timers, so the spawner must execute it on
    /// a tokio runtime.
    #[cfg(feature = "tokio-runtime")]
    pub(crate) fn tokio<S: Spawn>(
        pool: Arc<AdmissionPool>,
        interval: Duration,
        spawner: &S,
    ) -> Self {
        let shutdown = Arc::new(tokio::sync::Notify::new());
        let tick_pool = Arc::clone(&pool);
        let tick_shutdown = Arc::clone(&shutdown);
        spawner.spawn(async move {
            tick_task_loop(tick_pool, interval, tick_shutdown).await;
        });

        Self {
            pool,
            driver: TickDriver::Tokio { shutdown },
        }
    }

    /// Stop the tick driver without joining it. Idempotent.
    pub(crate) fn shutdown(&self) {
        match &self.driver {
            TickDriver::Thread { shutdown_tx } => {
                let mut tx = shutdown_tx.lock();
                if tx.take().is_some() {
                    debug!("tick thread for gate {} signaled to stop", self.pool.gate_id());
                }
            }
            #[cfg(feature = "tokio-runtime")]
            TickDriver::Tokio { shutdown } => {
                shutdown.notify_one();
                debug!("tick task for gate {} signaled to stop", self.pool.gate_id());
            }
        }
    }
}

/// Fire one drained batch. A panicking action must not take down the tick
/// driver; its slot stays held because the completion will never be reported.
fn fire_batch(actions: Vec<Action>) {
    for action in actions {
        if catch_unwind(AssertUnwindSafe(action)).is_err() {
            error!("admitted action panicked, its slot remains held");
        }
    }
}

/// Tick loop body for the OS-thread driver. Blocks on `recv_timeout` between
/// ticks; a shutdown message or sender drop ends the loop.
fn tick_thread_loop(pool: &AdmissionPool, interval: Duration, shutdown_rx: &Receiver<()>) {
    debug!("tick thread started for gate {}", pool.gate_id());
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        if pool.is_disposed() {
            break;
        }

        fire_batch(pool.drain_batch());
        // The next tick is only armed once the whole batch has reported back.
        pool.wait_batch_done();
        if pool.is_disposed() {
            break;
        }
    }
    debug!("tick thread exiting for gate {}", pool.gate_id());
}

/// Tick loop body for the tokio driver.
#[cfg(feature = "tokio-runtime")]
async fn tick_task_loop(
    pool: Arc<AdmissionPool>,
    interval: Duration,
    shutdown: Arc<tokio::sync::Notify>,
) {
    debug!("tick task started for gate {}", pool.gate_id());
    loop {
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = shutdown.notified() => break,
        }
        if pool.is_disposed() {
            break;
        }

        fire_batch(pool.drain_batch());
        // Wait on the parking_lot condvar from tokio's blocking pool.
        let wait_pool = Arc::clone(&pool);
        if tokio::task::spawn_blocking(move || wait_pool.wait_batch_done())
            .await
            .is_err()
        {
            break;
        }
        if pool.is_disposed() {
            break;
        }
    }
    debug!("tick task exiting for gate {}", pool.gate_id());
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::core::pool::DrainMode;

    use super::*;

    fn batch_pool(capacity: usize) -> Arc<AdmissionPool> {
        Arc::new(AdmissionPool::new(
            "test-gate".into(),
            capacity,
            DrainMode::Batch,
            None,
        ))
    }

    fn enqueue_counted(pool: &AdmissionPool, fired: &Arc<AtomicUsize>) {
        let fired = Arc::clone(fired);
        pool.request_admission(Box::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    }

    #[test]
    fn test_thread_driver_fires_one_batch_per_interval() {
        let pool = batch_pool(2);
        let fired = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            enqueue_counted(&pool, &fired);
        }

        let scheduler = BatchScheduler::thread(Arc::clone(&pool), Duration::from_millis(20));
        thread::sleep(Duration::from_millis(100));
        // No completions reported, so later ticks must not refill.
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        pool.report_completion();
        pool.report_completion();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(fired.load(Ordering::SeqCst), 4);

        pool.dispose();
        scheduler.shutdown();
    }

    #[test]
    fn test_thread_driver_stops_after_shutdown() {
        let pool = batch_pool(1);
        let fired = Arc::new(AtomicUsize::new(0));
        let scheduler = BatchScheduler::thread(Arc::clone(&pool), Duration::from_millis(10));

        pool.dispose();
        scheduler.shutdown();
        scheduler.shutdown();

        // Requests are refused once disposed, so nothing can ever fire.
        assert!(pool
            .request_admission(Box::new(|| {}))
            .is_err());
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_action_does_not_kill_the_loop() {
        let pool = batch_pool(1);
        let fired = Arc::new(AtomicUsize::new(0));
        pool.request_admission(Box::new(|| panic!("render blew up")))
            .unwrap();

        let scheduler = BatchScheduler::thread(Arc::clone(&pool), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(50));

        // The panicked unit never reports, so its slot is still held.
        assert_eq!(pool.stats().active, 1);

        // Reporting on its behalf lets the next batch through.
        pool.report_completion();
        enqueue_counted(&pool, &fired);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        pool.dispose();
        scheduler.shutdown();
    }
}
