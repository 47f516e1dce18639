//! Core admission state machine shared by both reclaim policies.
//!
//! One pool instance owns the `active` counter, the FIFO wait queue, and the
//! batch-outstanding counter behind a single `parking_lot::Mutex`. Every
//! operation is one short critical section; caller-supplied actions always
//! fire after the lock is released so an action may re-enter the gate
//! (request again, report a completion) without deadlocking.

use parking_lot::{Condvar, Mutex};

use crate::core::error::GateError;
use crate::core::events::{GateEvent, SharedSink};
use crate::core::queue::AdmissionQueue;
use crate::core::ticket::{Action, QueuedTicket, Ticket, TicketId, TicketIds};

/// How freed capacity is redistributed to queued tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainMode {
    /// Admit at request time while a slot is free; each completion report
    /// feeds exactly one queued successor.
    Immediate,
    /// Never admit at request time; a periodic tick drains up to `capacity`
    /// tickets once the previous batch has fully reported completion.
    Batch,
}

/// Point-in-time snapshot of a gate's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GateStats {
    /// Maximum number of concurrently active units.
    pub capacity: usize,
    /// Admitted units that have not yet reported completion.
    pub active: usize,
    /// Entries physically queued, canceled stragglers included.
    pub queued: usize,
    /// Tickets fired by the current drain that have not yet reported back.
    pub batch_outstanding: usize,
    /// Whether the gate has been disposed.
    pub disposed: bool,
    /// Actions fired since construction.
    pub total_admitted: u64,
    /// Completion reports accepted since construction.
    pub total_completed: u64,
    /// Canceled entries discarded by pops and drains since construction.
    pub total_skipped: u64,
}

/// Mutable state guarded by the pool mutex.
#[derive(Default)]
struct PoolState {
    active: usize,
    batch_outstanding: usize,
    disposed: bool,
    queue: AdmissionQueue,
    total_admitted: u64,
    total_completed: u64,
    total_skipped: u64,
}

/// Admission pool with capacity accounting and lazy cancellation.
///
/// Uses one `parking_lot::Mutex` around all counters and the queue (interleaved
/// mutation would break the capacity invariant) and a `parking_lot::Condvar`
/// signaled when the current batch has fully reported completion.
pub(crate) struct AdmissionPool {
    gate_id: String,
    capacity: usize,
    mode: DrainMode,
    state: Mutex<PoolState>,
    /// Signaled when `batch_outstanding` reaches zero or the pool is disposed.
    batch_done: Condvar,
    ids: TicketIds,
    sink: Option<SharedSink>,
}

impl AdmissionPool {
    /// Create a pool. `capacity` is validated by the configuration layer.
    pub(crate) fn new(
        gate_id: String,
        capacity: usize,
        mode: DrainMode,
        sink: Option<SharedSink>,
    ) -> Self {
        Self {
            gate_id,
            capacity,
            mode,
            state: Mutex::new(PoolState::default()),
            batch_done: Condvar::new(),
            ids: TicketIds::default(),
            sink,
        }
    }

    pub(crate) fn gate_id(&self) -> &str {
        &self.gate_id
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn mode(&self) -> DrainMode {
        self.mode
    }

    /// Request permission to run `action`.
    ///
    /// Immediate mode admits synchronously while a slot is free; the action
    /// runs on the caller's stack before this returns. Otherwise (and always
    /// in batch mode) the action is queued and the returned ticket's cancel
    /// flag is live.
    pub(crate) fn request_admission(&self, action: Action) -> Result<Ticket, GateError> {
        let mut state = self.state.lock();
        if state.disposed {
            return Err(GateError::Disposed);
        }
        let id = self.ids.next();

        if self.mode == DrainMode::Immediate && state.active < self.capacity {
            state.active += 1;
            state.total_admitted += 1;
            drop(state);

            tracing::debug!("ticket {} admitted immediately", id);
            self.emit(GateEvent::AdmittedImmediately { ticket: id });
            // Fired after unlock so the action may re-enter the gate.
            action();
            return Ok(Ticket::already_admitted(id));
        }

        let (entry, canceled) = QueuedTicket::new(id, action);
        state.queue.push(entry);
        let depth = state.queue.len();
        drop(state);

        tracing::debug!("ticket {} enqueued, queue depth {}", id, depth);
        self.emit(GateEvent::Enqueued { ticket: id });
        Ok(Ticket::pending(id, canceled))
    }

    /// Report that one previously admitted unit has finished.
    ///
    /// Immediate mode frees the slot and fires exactly one surviving queued
    /// successor. Batch mode frees the slot and, when the whole batch has
    /// reported, releases the tick driver's wait. Pairing one report per
    /// admission is the caller's contract; an unmatched report is dropped
    /// with a warning rather than driving `active` below zero.
    pub(crate) fn report_completion(&self) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }
        if state.active == 0 {
            drop(state);
            tracing::warn!("completion reported with no active admission");
            return;
        }
        state.active -= 1;
        state.total_completed += 1;

        match self.mode {
            DrainMode::Immediate => {
                let (live, skipped) = state.queue.pop_live();
                state.total_skipped += skipped.len() as u64;
                // The freed slot feeds exactly one successor.
                let fired = live.map(|entry| {
                    state.active += 1;
                    state.total_admitted += 1;
                    (entry.id, entry.into_action())
                });
                drop(state);

                self.emit(GateEvent::Completed);
                for id in skipped {
                    tracing::debug!("ticket {} discarded, was canceled", id);
                    self.emit(GateEvent::SkippedCanceled { ticket: id });
                }
                if let Some((id, action)) = fired {
                    tracing::debug!("ticket {} fired by freed slot", id);
                    self.emit(GateEvent::Fired { ticket: id });
                    action();
                }
            }
            DrainMode::Batch => {
                state.batch_outstanding = state.batch_outstanding.saturating_sub(1);
                let batch_done = state.batch_outstanding == 0;
                drop(state);

                self.emit(GateEvent::Completed);
                if batch_done {
                    self.batch_done.notify_all();
                }
            }
        }
    }

    /// One batch drain step, called by the tick driver.
    ///
    /// Gated on `active == 0`: a tick that lands while a batch is still
    /// outstanding leaves the state untouched. Pops up to `capacity`
    /// surviving tickets in FIFO order, discarding canceled entries without
    /// counting them toward the batch, and returns the actions for the
    /// driver to fire.
    pub(crate) fn drain_batch(&self) -> Vec<Action> {
        let mut state = self.state.lock();
        if state.disposed || state.active != 0 || state.queue.is_empty() {
            return Vec::new();
        }

        let mut fired: Vec<(TicketId, Action)> = Vec::new();
        let mut skipped: Vec<TicketId> = Vec::new();
        while state.active < self.capacity {
            let (live, mut skips) = state.queue.pop_live();
            skipped.append(&mut skips);
            match live {
                Some(entry) => {
                    state.active += 1;
                    state.batch_outstanding += 1;
                    state.total_admitted += 1;
                    fired.push((entry.id, entry.into_action()));
                }
                None => break,
            }
        }
        state.total_skipped += skipped.len() as u64;
        drop(state);

        for id in &skipped {
            tracing::debug!("ticket {} discarded, was canceled", id);
            self.emit(GateEvent::SkippedCanceled { ticket: *id });
        }
        for (id, _) in &fired {
            self.emit(GateEvent::Fired { ticket: *id });
        }
        if !fired.is_empty() {
            tracing::debug!("drain fired {} tickets", fired.len());
            self.emit(GateEvent::Drained {
                fired: fired.len(),
            });
        }
        fired.into_iter().map(|(_, action)| action).collect()
    }

    /// Block until every ticket fired by the current drain has reported
    /// completion, or the pool is disposed. Called from the tick driver.
    pub(crate) fn wait_batch_done(&self) {
        let mut state = self.state.lock();
        while state.batch_outstanding > 0 && !state.disposed {
            self.batch_done.wait(&mut state);
        }
    }

    /// Tear the pool down: drop every pending entry and refuse further
    /// admissions. Idempotent; returns whether this call was the one that
    /// disposed the pool.
    pub(crate) fn dispose(&self) -> bool {
        let mut state = self.state.lock();
        if state.disposed {
            return false;
        }
        state.disposed = true;
        let dropped = state.queue.clear();
        drop(state);

        // Wake a tick driver blocked on the batch signal so it can exit.
        self.batch_done.notify_all();

        if dropped > 0 {
            tracing::debug!("gate {} dropped {} pending tickets at disposal", self.gate_id, dropped);
        }
        self.emit(GateEvent::Disposed { dropped });
        true
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Snapshot the counters in one critical section.
    pub(crate) fn stats(&self) -> GateStats {
        let state = self.state.lock();
        GateStats {
            capacity: self.capacity,
            active: state.active,
            queued: state.queue.len(),
            batch_outstanding: state.batch_outstanding,
            disposed: state.disposed,
            total_admitted: state.total_admitted,
            total_completed: state.total_completed,
            total_skipped: state.total_skipped,
        }
    }

    /// Record an event (sync operation with parking_lot mutex).
    fn emit(&self, event: GateEvent) {
        if let Some(sink) = &self.sink {
            let mut sink = sink.lock();
            sink.record(event);
        }
    }
}
