//! Adapter implementations for resource ports.

pub mod memory;
pub mod postgres;
