//! Command port invoked when a scheduled task is dispatched.

use crate::schedule::domain::CommandIdentifier;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for command dispatch.
pub type CommandResult<T> = Result<T, CommandError>;

/// Runs the work a command identifier refers to.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Runs `command` to completion.
    async fn dispatch(&self, command: &CommandIdentifier) -> CommandResult<()>;
}

/// A single runnable command registered under an identifier.
#[async_trait]
pub trait ScheduledCommand: Send + Sync {
    /// Runs the command to completion.
    async fn run(&self) -> CommandResult<()>;
}

/// Errors returned by command dispatch.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// No handler is registered for the identifier.
    #[error("unknown command: {0}")]
    UnknownCommand(CommandIdentifier),

    /// The command ran and reported failure.
    #[error("command {command} failed: {message}")]
    Failed {
        /// Command identifier.
        command: CommandIdentifier,
        /// Failure description.
        message: String,
    },

    /// The command could not be started.
    #[error("command runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl CommandError {
    /// Wraps a runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
