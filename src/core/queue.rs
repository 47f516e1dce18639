//! In-memory FIFO of pending admission tickets.
//!
//! Insertion order is the order `request_admission` was called; entries are
//! never reordered or deduplicated. Canceled entries are not spliced out:
//! they are discarded when a pop walks past them, trading O(n) worst-case
//! skip-scanning for O(1) cancellation.

use std::collections::VecDeque;

use crate::core::ticket::{QueuedTicket, TicketId};

/// FIFO queue of pending tickets with lazy cancellation.
#[derive(Debug, Default)]
pub(crate) struct AdmissionQueue {
    entries: VecDeque<QueuedTicket>,
}

impl AdmissionQueue {
    /// Append an entry at the back.
    pub(crate) fn push(&mut self, entry: QueuedTicket) {
        self.entries.push_back(entry);
    }

    /// Pop the first live entry, discarding canceled entries along the way.
    ///
    /// Returns the entry (if any survives) together with the ids of the
    /// canceled entries that were skipped and dropped.
    pub(crate) fn pop_live(&mut self) -> (Option<QueuedTicket>, Vec<TicketId>) {
        let mut skipped = Vec::new();
        while let Some(entry) = self.entries.pop_front() {
            if entry.is_canceled() {
                skipped.push(entry.id);
                continue;
            }
            return (Some(entry), skipped);
        }
        (None, skipped)
    }

    /// Drop every pending entry, returning how many were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
