//! Child-process command adapter.
//!
//! Scheduled maintenance commands are external programs (for example the
//! game's console entry point with a subcommand argument). This adapter runs
//! one such program to completion and maps a non-zero exit to
//! [`CommandError::Failed`].

use crate::schedule::{
    domain::CommandIdentifier,
    ports::{CommandError, CommandResult, ScheduledCommand},
};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// External program invoked for a scheduled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    command: CommandIdentifier,
    program: String,
    args: Vec<String>,
}

impl ProcessCommand {
    /// Creates a process command for `program` without arguments.
    #[must_use]
    pub fn new(command: CommandIdentifier, program: impl Into<String>) -> Self {
        Self {
            command,
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Sets the program arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Returns the command line as a shell-escaped string for logging.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_escape)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl ScheduledCommand for ProcessCommand {
    async fn run(&self) -> CommandResult<()> {
        info!(
            command = %self.command,
            command_line = %self.command_line(),
            "starting scheduled command"
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(CommandError::runtime)?;

        if output.status.success() {
            debug!(
                command = %self.command,
                stdout = %String::from_utf8_lossy(&output.stdout).trim_end(),
                "scheduled command finished"
            );
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("exited with {}", output.status),
            detail => format!("exited with {}: {detail}", output.status),
        };
        Err(CommandError::Failed {
            command: self.command.clone(),
            message,
        })
    }
}

/// Escapes a value for safe inclusion in a POSIX shell command.
///
/// Uses single-quote wrapping and the standard `'\''` sequence for embedded
/// quotes.
#[must_use]
pub fn shell_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            escaped.push_str("'\\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}
