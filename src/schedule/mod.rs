//! Toggleable recurring tasks and their tick-driven scheduler.
//!
//! Operators provision named tasks, switch them on and off, and an external
//! trigger calls the scheduler once per interval. The scheduler dispatches
//! each due task at most once per tick window, guarded by a per-task lease.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
