//! Application services for task registration and tick-driven dispatch.

mod commands;
mod registry;
mod scheduler;

pub use commands::CommandRegistry;
pub use registry::{ProvisionOutcome, TaskRegistryError, TaskRegistryResult, TaskRegistryService};
pub use scheduler::{
    SchedulerError, SchedulerResult, SchedulerSettings, TaskScheduler, TaskTickOutcome,
    TickReport,
};
