// src/exec/mod.rs

//! Execution layer.
//!
//! This module decides *where* task bodies run and how the launcher's
//! deferred units are started, joined and cancelled.
//!
//! - [`context`] provides [`ExecutionContext`] (worker pool, blocking pool,
//!   a dedicated runtime, or a caller-supplied [`Dispatcher`]).
//! - [`scope`] provides [`LaunchScope`], the structured-concurrency boundary
//!   that all units of one launch are spawned into.
//! - [`unit`] provides [`Unit`], the lazily started, joinable handle bound to
//!   one task of the graph.

pub mod context;
pub mod scope;
pub mod unit;

pub use context::{DispatchFuture, Dispatcher, ExecutionContext};
pub use scope::LaunchScope;
pub use unit::{Unit, UnitState};
