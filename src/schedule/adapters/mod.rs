//! Adapter implementations for scheduled task ports.

pub mod memory;
pub mod postgres;

mod process;

pub use process::{ProcessCommand, shell_escape};
