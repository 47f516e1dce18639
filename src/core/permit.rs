//! Async acquisition surface built on the callback protocol.
//!
//! `acquire` wraps `request_admission` in a future: the admission action sends
//! an [`AdmissionPermit`] through a oneshot channel, and the permit reports
//! completion when released or dropped. Dropping the future before admission
//! cancels the underlying ticket, so an abandoned waiter never consumes a
//! slot.

use std::sync::Arc;

use crate::core::error::GateError;
use crate::core::pool::AdmissionPool;
use crate::core::ticket::Ticket;

/// Proof of one admission, reporting completion on release or drop.
///
/// Holding the permit holds the slot. `report_completion` is called exactly
/// once per permit, whichever way it ends.
pub struct AdmissionPermit {
    pool: Arc<AdmissionPool>,
}

impl AdmissionPermit {
    pub(crate) fn new(pool: Arc<AdmissionPool>) -> Self {
        Self { pool }
    }

    /// Report completion now instead of at drop time.
    pub fn release(self) {}
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.pool.report_completion();
    }
}

impl std::fmt::Debug for AdmissionPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionPermit").finish_non_exhaustive()
    }
}

/// Cancels the pending ticket unless the wait completed.
struct CancelOnDrop {
    ticket: Option<Ticket>,
}

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(ticket) = &self.ticket {
            ticket.cancel();
        }
    }
}

/// Wait for admission and resolve to a permit.
///
/// In immediate mode with a free slot this resolves without suspending. A
/// disposed gate resolves to `Err(GateError::Disposed)`, including when the
/// gate is disposed while this waiter is still queued.
pub(crate) async fn acquire(pool: &Arc<AdmissionPool>) -> Result<AdmissionPermit, GateError> {
    let (tx, rx) = tokio::sync::oneshot::channel::<AdmissionPermit>();
    let action_pool = Arc::clone(pool);
    let ticket = pool.request_admission(Box::new(move || {
        let permit = AdmissionPermit::new(action_pool);
        // A failed send means the waiter vanished after admission; dropping
        // the returned permit reports the completion straight back.
        let _ = tx.send(permit);
    }))?;

    let mut guard = CancelOnDrop {
        ticket: Some(ticket),
    };
    match rx.await {
        Ok(permit) => {
            guard.disarm();
            Ok(permit)
        }
        // The queued entry was dropped without firing, which only disposal
        // or our own cancellation can cause.
        Err(_) => Err(GateError::Disposed),
    }
}
