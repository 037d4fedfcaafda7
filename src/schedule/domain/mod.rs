//! Domain model for named recurring tasks.
//!
//! Scheduled tasks are provisioned from seed configuration, switched on and
//! off by operators, and dispatched at most once per tick window. Leases
//! record which scheduler process currently owns a task's dispatch slot.

mod error;
mod expression;
mod lease;
mod name;
mod task;

pub use error::ScheduleDomainError;
pub use expression::{ScheduleExpression, TickWindow};
pub use lease::{LockOwner, TaskLease};
pub use name::{CommandIdentifier, TaskName};
pub use task::{PersistedScheduledTaskData, ScheduledTask, TaskDefinition};
