//! Admission lifecycle events.
//!
//! Controllers optionally report their decisions to an [`EventSink`]. Sinks see
//! every admission, enqueue, fire, cancellation skip, completion, drain, and
//! disposal, in the order the controller performed them. The built-in
//! [`InMemoryEventSink`] keeps a bounded ring of recent events and is the
//! workhorse of the ordering tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::ticket::TicketId;

/// One admission-lifecycle fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// A request found a free slot and its action fired at request time.
    AdmittedImmediately {
        /// Ticket that was admitted.
        ticket: TicketId,
    },
    /// A request was appended to the wait queue.
    Enqueued {
        /// Ticket that was queued.
        ticket: TicketId,
    },
    /// A queued ticket's action fired, consuming a slot.
    Fired {
        /// Ticket that fired.
        ticket: TicketId,
    },
    /// A canceled ticket was reached and dropped without firing.
    SkippedCanceled {
        /// Ticket that was discarded.
        ticket: TicketId,
    },
    /// A completion report freed one slot. The report itself is anonymous:
    /// the protocol does not say which admitted unit finished.
    Completed,
    /// A batch drain fired this many tickets in one step.
    Drained {
        /// Number of live tickets fired by the drain.
        fired: usize,
    },
    /// The controller was disposed; this many pending tickets were dropped.
    Disposed {
        /// Number of queue entries discarded at disposal.
        dropped: usize,
    },
}

/// Sink receiving admission lifecycle events.
pub trait EventSink: Send {
    /// Record an event.
    fn record(&mut self, event: GateEvent);
}

/// Shared sink storage installed into a controller.
pub(crate) type SharedSink = Arc<Mutex<Box<dyn EventSink>>>;

/// In-memory sink over a shared bounded ring buffer.
///
/// Cloning is cheap and every clone observes the same buffer, so a test can
/// keep one handle and install another into the controller.
#[derive(Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<VecDeque<GateEvent>>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// Snapshot of stored events, oldest first.
    pub fn events(&self) -> Vec<GateEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, event: GateEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}
