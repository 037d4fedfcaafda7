//! Error types for scheduled task validation and parsing.

use thiserror::Error;

/// Errors returned while constructing scheduled task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name contains whitespace or exceeds the length limit.
    #[error("invalid task name '{0}', expected at most 100 non-whitespace characters")]
    InvalidTaskName(String),

    /// The command identifier is empty after trimming.
    #[error("command identifier must not be empty")]
    EmptyCommand,

    /// The command identifier exceeds the persisted column width.
    #[error("command identifier is {0} characters long, the limit is 255")]
    CommandTooLong(usize),

    /// The schedule expression is neither `HH:MM` nor a cron expression.
    #[error("invalid schedule expression '{expression}': {reason}")]
    InvalidScheduleExpression {
        /// Raw expression as supplied.
        expression: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The lock owner identifier is empty after trimming.
    #[error("lock owner must not be empty")]
    EmptyLockOwner,
}
