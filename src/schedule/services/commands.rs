//! Identifier-to-handler command dispatch.

use crate::schedule::{
    domain::CommandIdentifier,
    ports::{CommandDispatcher, CommandError, CommandResult, ScheduledCommand},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Dispatcher that looks commands up in an explicit table.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<CommandIdentifier, Arc<dyn ScheduledCommand>>,
}

impl CommandRegistry {
    /// Creates an empty command registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `command` under `identifier`, replacing any previous
    /// handler.
    #[must_use]
    pub fn with_command(
        mut self,
        identifier: CommandIdentifier,
        command: Arc<dyn ScheduledCommand>,
    ) -> Self {
        self.commands.insert(identifier, command);
        self
    }

    /// Returns `true` when a handler is registered for `identifier`.
    #[must_use]
    pub fn contains(&self, identifier: &CommandIdentifier) -> bool {
        self.commands.contains_key(identifier)
    }
}

#[async_trait]
impl CommandDispatcher for CommandRegistry {
    async fn dispatch(&self, command: &CommandIdentifier) -> CommandResult<()> {
        let handler = self
            .commands
            .get(command)
            .ok_or_else(|| CommandError::UnknownCommand(command.clone()))?;
        handler.run().await
    }
}
