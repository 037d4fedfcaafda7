//! In-memory adapters for scheduled task persistence and leasing.

mod lock;
mod task;

pub use lock::InMemoryTaskLock;
pub use task::InMemoryScheduledTaskRepository;
