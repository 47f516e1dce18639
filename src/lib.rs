//! # Render Gate
//!
//! A concurrency-limiting admission controller for workloads that must start
//! gradually instead of all at once.
//!
//! This library provides a small scheduling layer for the "thousands of
//! producers, one renderer" shape: many independent units of work each want
//! to start exactly once, and starting them all in the same instant overloads
//! a frame-paced consumer. A gate decides *when* each unit may proceed,
//! bounding how many run concurrently and optionally draining the backlog in
//! fixed-size batches on a timer.
//!
//! ## Core Problem Solved
//!
//! Admission control for gradual startup differs from ordinary task queues:
//!
//! - **Bounded concurrency**: at most `capacity` units may be in flight; the
//!   bound must hold across every interleaving of requests and completions
//! - **Cheap abandonment**: a producer that goes away before being admitted
//!   must cost nothing - its queued ticket is skipped, never fired
//! - **Paced refill**: reactive slot-by-slot refill is sometimes still too
//!   eager; batch draining decouples "how many at once" from "how often"
//! - **Caller-owned completion**: the gate never observes the work itself;
//!   each admitted unit reports back exactly once when it finishes
//!
//! ## Two Reclaim Policies
//!
//! - **Immediate**: `request_admission` admits on the spot while a slot is
//!   free; each `report_completion` hands the freed slot to exactly one
//!   queued successor, in FIFO order.
//! - **Batch**: admission only ever happens on a periodic tick. Each tick
//!   drains up to `capacity` tickets, then the next drain waits until the
//!   whole batch has reported completion.
//!
//! ## Callback Protocol
//!
//! ```rust,ignore
//! use render_gate::core::RenderGate;
//!
//! let gate = RenderGate::immediate(4)?;
//!
//! // Each producer asks once; the action runs now or when a slot frees.
//! let ticket = gate.request_admission(|| start_render())?;
//!
//! // A producer that unmounts before being admitted cancels its ticket.
//! ticket.cancel();
//!
//! // Every admitted unit reports exactly once when its work is done.
//! gate.report_completion();
//! ```
//!
//! ## Batch Draining
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use render_gate::core::RenderGate;
//!
//! // Fire at most 8 queued renders every 250ms, and only once the
//! // previous batch has fully reported completion.
//! let gate = RenderGate::batch(8, Duration::from_millis(250))?;
//! ```
//!
//! ## Async Acquisition
//!
//! With the `tokio-runtime` feature (default), admission can be awaited and
//! completion reported by an RAII permit:
//!
//! ```rust,ignore
//! let permit = gate.acquire().await?;
//! render_item().await;
//! permit.release(); // or simply drop it
//! ```
//!
//! Gates can also be built from JSON configuration via
//! `config::GatesConfig::from_json_str` and `builders::build_gates`.
//!
//! For complete examples, see:
//! - `tests/admission_flow_test.rs` - immediate-policy integration tests
//! - `tests/batch_drain_test.rs` - batch-policy integration tests
//! - `README.md` - documentation

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core admission-control state machine and its drivers.
pub mod core;
/// Configuration models for gates and their tick drivers.
pub mod config;
/// Builders to construct gates from configuration.
pub mod builders;
/// Runtime adapters for driving gates from async hosts.
pub mod runtime;
/// Shared utilities.
pub mod util;
