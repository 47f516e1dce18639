//! Admission tickets and their cancellation protocol.
//!
//! A [`Ticket`] is the handle a caller receives from `request_admission`. It
//! carries a one-shot cancellation flag shared with the queued entry; firing a
//! canceled entry is a silent skip, never an error. Cancellation is lazy: the
//! entry stays physically queued until a reclaim or drain pass walks past it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier of a ticket within a single gate instance.
///
/// Ids increase monotonically in admission-request order and are used only for
/// logging and lifecycle events; they carry no scheduling meaning.
pub type TicketId = u64;

/// The deferred zero-argument side effect fired upon admission.
pub(crate) type Action = Box<dyn FnOnce() + Send + 'static>;

/// Caller-facing handle for one admission request.
///
/// Dropping a `Ticket` does nothing; a caller that no longer wants its turn
/// must call [`cancel`](Self::cancel). Canceling after the action has fired
/// (or after the entry was discarded) has no effect.
#[derive(Debug)]
pub struct Ticket {
    id: TicketId,
    canceled: Arc<AtomicBool>,
}

impl Ticket {
    /// Handle for a request that was queued; shares the entry's flag.
    pub(crate) fn pending(id: TicketId, canceled: Arc<AtomicBool>) -> Self {
        Self { id, canceled }
    }

    /// Handle for a request admitted synchronously. The flag is owned by this
    /// handle alone, so cancellation is a documented no-op.
    pub(crate) fn already_admitted(id: TicketId) -> Self {
        Self {
            id,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// This ticket's id.
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Cancel the pending admission.
    ///
    /// Idempotent: calling it any number of times is equivalent to calling it
    /// once. If the ticket already fired or was discarded, nothing happens.
    pub fn cancel(&self) {
        if !self.canceled.swap(true, Ordering::AcqRel) {
            tracing::debug!("ticket {} canceled", self.id);
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called on this ticket.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

/// Queue-side entry owning the deferred action.
pub(crate) struct QueuedTicket {
    pub(crate) id: TicketId,
    action: Action,
    canceled: Arc<AtomicBool>,
}

impl QueuedTicket {
    /// Build an entry plus the cancellation flag to hand to the caller.
    pub(crate) fn new(id: TicketId, action: Action) -> (Self, Arc<AtomicBool>) {
        let canceled = Arc::new(AtomicBool::new(false));
        let entry = Self {
            id,
            action,
            canceled: Arc::clone(&canceled),
        };
        (entry, canceled)
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Surrender the action for firing. The entry is consumed; the type system
    /// guarantees the action cannot fire twice.
    pub(crate) fn into_action(self) -> Action {
        self.action
    }
}

impl std::fmt::Debug for QueuedTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedTicket")
            .field("id", &self.id)
            .field("canceled", &self.is_canceled())
            .finish_non_exhaustive()
    }
}

/// Monotonic ticket-id allocator, one per gate instance.
#[derive(Debug, Default)]
pub(crate) struct TicketIds(AtomicU64);

impl TicketIds {
    pub(crate) fn next(&self) -> TicketId {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}
