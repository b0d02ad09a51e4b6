// src/dag/mod.rs

//! Task graph representation.
//!
//! - [`graph`] holds the mutable [`TaskGraph`] callers register tasks into.
//! - [`node`] provides task metadata ([`TaskRecord`], [`TaskOptions`]) and
//!   the adjacency-carrying [`Node`].
//! - [`peel`] implements the in-degree peeling used for both cycle detection
//!   and launch ordering.

pub mod graph;
pub mod node;
pub mod peel;

pub use graph::TaskGraph;
pub use node::{Node, TaskOptions, TaskRecord};
pub use peel::{NodeMap, peel};
