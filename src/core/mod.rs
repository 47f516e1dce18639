//! Core admission-control state machine and its drivers.

mod batch;
mod queue;

pub mod controller;
pub mod error;
pub mod events;
pub mod pool;
pub mod ticket;

#[cfg(feature = "tokio-runtime")]
pub mod permit;

pub use controller::RenderGate;
pub use error::{AppResult, GateError};
pub use events::{EventSink, GateEvent, InMemoryEventSink};
pub use pool::{DrainMode, GateStats};
pub use ticket::{Ticket, TicketId};

#[cfg(feature = "tokio-runtime")]
pub use permit::AdmissionPermit;
