//! Port contracts for scheduled task registration and dispatch.
//!
//! Ports define infrastructure-agnostic interfaces used by schedule services.

mod command;
mod lock;
mod repository;

pub use command::{CommandDispatcher, CommandError, CommandResult, ScheduledCommand};
pub use lock::{TaskLockError, TaskLockProvider, TaskLockResult};
pub use repository::{
    ScheduledTaskRepository, ScheduledTaskRepositoryError, ScheduledTaskRepositoryResult,
};
