//! TOML configuration for the `stellar-jobs` binary.
//!
//! ```toml
//! database_url = "postgres://stellar@localhost/stellar"
//!
//! [scheduler]
//! tick_window_secs = 60
//! lease_ttl_secs = 600
//! lock_owner = "jobs-host-1"
//!
//! [[tasks]]
//! name = "prune-sessions"
//! command = "stellar:prune-sessions"
//! schedule = "03:30"
//!
//! [commands."stellar:prune-sessions"]
//! program = "php"
//! args = ["artisan", "sessions:prune"]
//! ```
//!
//! `STELLAR_DATABASE_URL` and `STELLAR_LOCK_OWNER` override the file values.

use crate::schedule::{
    adapters::ProcessCommand,
    domain::{CommandIdentifier, LockOwner, ScheduleDomainError, TaskDefinition},
    services::{CommandRegistry, SchedulerSettings},
};
use chrono::TimeDelta;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable overriding `database_url`.
pub const DATABASE_URL_ENV: &str = "STELLAR_DATABASE_URL";
/// Environment variable overriding `scheduler.lock_owner`.
pub const LOCK_OWNER_ENV: &str = "STELLAR_LOCK_OWNER";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[source] Box<toml::de::Error>),

    /// No database URL was configured.
    #[error("database_url is not set and {DATABASE_URL_ENV} is not exported")]
    MissingDatabaseUrl,

    /// A duration setting is zero or out of range.
    #[error("scheduler.{field} must be between 1 and {max} seconds, got {value}")]
    InvalidDuration {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// Two seed tasks share a name.
    #[error("task '{0}' is defined more than once")]
    DuplicateTask(String),

    /// A command entry has no program.
    #[error("command '{0}' has an empty program")]
    EmptyProgram(CommandIdentifier),

    /// A scheduler identity value failed validation.
    #[error(transparent)]
    Schedule(#[from] ScheduleDomainError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StellarJobsConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: Option<String>,
    /// Tick and lease settings.
    pub scheduler: SchedulerConfig,
    /// Tasks created or refreshed by `provision`.
    pub tasks: Vec<TaskDefinition>,
    /// External programs backing command identifiers.
    pub commands: BTreeMap<CommandIdentifier, CommandConfig>,
}

/// `[scheduler]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Width of the tick window in seconds.
    pub tick_window_secs: u64,
    /// Lease lifetime in seconds.
    pub lease_ttl_secs: u64,
    /// Lease holder identity; defaults to the binary name and process id.
    pub lock_owner: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_window_secs: 60,
            lease_ttl_secs: 600,
            lock_owner: None,
        }
    }
}

/// `[commands.<id>]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Program to execute.
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Longest accepted duration setting: one day.
const MAX_DURATION_SECS: u64 = 86_400;

impl StellarJobsConfig {
    /// Reads `path`, applies environment overrides, and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read,
    /// [`ConfigError::Parse`] for malformed TOML, and a validation variant
    /// when a setting is out of range.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config =
            Self::parse(&content)?.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without consulting the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(Box::new(err)))
    }

    /// Replaces file values with those reported by `lookup` for
    /// [`DATABASE_URL_ENV`] and [`LOCK_OWNER_ENV`].
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(owner) = lookup(LOCK_OWNER_ENV).filter(|value| !value.trim().is_empty()) {
            self.scheduler.lock_owner = Some(owner);
        }
        self
    }

    /// Checks value ranges and cross-entry consistency.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> ConfigResult<()> {
        check_duration("tick_window_secs", self.scheduler.tick_window_secs)?;
        check_duration("lease_ttl_secs", self.scheduler.lease_ttl_secs)?;
        if let Some(owner) = &self.scheduler.lock_owner {
            LockOwner::new(owner.as_str())?;
        }
        let mut seen = BTreeSet::new();
        for task in &self.tasks {
            if !seen.insert(task.name().as_str()) {
                return Err(ConfigError::DuplicateTask(task.name().to_string()));
            }
        }
        if let Some(id) = self
            .commands
            .iter()
            .find(|(_, command)| command.program.trim().is_empty())
            .map(|(id, _)| id)
        {
            return Err(ConfigError::EmptyProgram(id.clone()));
        }
        Ok(())
    }

    /// Returns the database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when none is configured.
    pub fn database_url(&self) -> ConfigResult<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Builds scheduler settings from the `[scheduler]` table.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range durations or a blank lock
    /// owner.
    pub fn scheduler_settings(&self) -> ConfigResult<SchedulerSettings> {
        let tick_window = check_duration("tick_window_secs", self.scheduler.tick_window_secs)?;
        let lease_ttl = check_duration("lease_ttl_secs", self.scheduler.lease_ttl_secs)?;
        let owner = match &self.scheduler.lock_owner {
            Some(owner) => LockOwner::new(owner.as_str())?,
            None => LockOwner::new(format!("stellar-jobs-{}", std::process::id()))?,
        };
        Ok(SchedulerSettings::new(owner)
            .with_tick_window(tick_window)
            .with_lease_ttl(lease_ttl))
    }

    /// Builds a command registry running each configured program.
    #[must_use]
    pub fn command_registry(&self) -> CommandRegistry {
        self.commands
            .iter()
            .fold(CommandRegistry::new(), |registry, (id, command)| {
                let process = ProcessCommand::new(id.clone(), command.program.as_str())
                    .with_args(command.args.iter().cloned());
                registry.with_command(id.clone(), Arc::new(process))
            })
    }
}

fn check_duration(field: &'static str, value: u64) -> ConfigResult<TimeDelta> {
    let invalid = || ConfigError::InvalidDuration {
        field,
        value,
        max: MAX_DURATION_SECS,
    };
    if value == 0 || value > MAX_DURATION_SECS {
        return Err(invalid());
    }
    let seconds = i64::try_from(value).map_err(|_| invalid())?;
    TimeDelta::try_seconds(seconds).ok_or_else(invalid)
}
