//! Lease-based mutual exclusion records for scheduled task dispatch.

use super::{ScheduleDomainError, TaskName};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of the scheduler process that holds a lease.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LockOwner(String);

impl LockOwner {
    /// Creates a validated lock owner.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyLockOwner`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ScheduleDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScheduleDomainError::EmptyLockOwner);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the owner as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LockOwner {
    type Error = ScheduleDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LockOwner> for String {
    fn from(value: LockOwner) -> Self {
        value.0
    }
}

impl fmt::Display for LockOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Time-bounded claim on a task's dispatch slot.
///
/// Each acquisition receives a fresh `lease_id`, so a holder whose lease
/// expired and was reclaimed cannot release its successor's lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLease {
    lease_id: Uuid,
    task: TaskName,
    owner: LockOwner,
    acquired_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TaskLease {
    /// Creates a lease for `task` held by `owner` from `now` for `ttl`.
    #[must_use]
    pub fn grant(task: TaskName, owner: LockOwner, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            lease_id: Uuid::new_v4(),
            task,
            owner,
            acquired_at: now,
            expires_at: now + ttl,
        }
    }

    /// Returns the per-acquisition identifier.
    #[must_use]
    pub const fn lease_id(&self) -> Uuid {
        self.lease_id
    }

    /// Returns the leased task name.
    #[must_use]
    pub const fn task(&self) -> &TaskName {
        &self.task
    }

    /// Returns the holder.
    #[must_use]
    pub const fn owner(&self) -> &LockOwner {
        &self.owner
    }

    /// Returns the acquisition timestamp.
    #[must_use]
    pub const fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` once the lease may be reclaimed by another holder.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
