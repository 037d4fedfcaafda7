//! Validated identifiers for scheduled tasks and the commands they run.

use super::ScheduleDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, human-readable name of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskName(String);

impl TaskName {
    const MAX_LENGTH: usize = 100;

    /// Creates a validated task name.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyTaskName`] for blank input and
    /// [`ScheduleDomainError::InvalidTaskName`] when the trimmed value
    /// contains whitespace or exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ScheduleDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScheduleDomainError::EmptyTaskName);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH || trimmed.chars().any(char::is_whitespace)
        {
            return Err(ScheduleDomainError::InvalidTaskName(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskName {
    type Error = ScheduleDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskName> for String {
    fn from(value: TaskName) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to the unit of work a scheduled task triggers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandIdentifier(String);

impl CommandIdentifier {
    const MAX_LENGTH: usize = 255;

    /// Creates a validated command identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyCommand`] for blank input and
    /// [`ScheduleDomainError::CommandTooLong`] past 255 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ScheduleDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScheduleDomainError::EmptyCommand);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ScheduleDomainError::CommandTooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommandIdentifier {
    type Error = ScheduleDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommandIdentifier> for String {
    fn from(value: CommandIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for CommandIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
