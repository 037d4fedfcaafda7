//! Step definitions for resource generation and approval scenarios.

pub mod given;
pub mod then;
pub mod when;
