//! Diesel row models for scheduled task persistence.

use super::schema::{scheduled_tasks, task_leases};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for scheduled task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scheduled_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduledTaskRow {
    /// Unique task name.
    pub name: String,
    /// Command identifier.
    pub command: String,
    /// Schedule expression.
    pub schedule: String,
    /// Optional description.
    pub description: Option<String>,
    /// Enabled flag.
    pub is_enabled: bool,
    /// Last dispatch timestamp.
    pub last_run_at: Option<DateTime<Utc>>,
    /// Next expected dispatch timestamp.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for scheduled task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scheduled_tasks)]
pub struct NewScheduledTaskRow {
    /// Unique task name.
    pub name: String,
    /// Command identifier.
    pub command: String,
    /// Schedule expression.
    pub schedule: String,
    /// Optional description.
    pub description: Option<String>,
    /// Enabled flag.
    pub is_enabled: bool,
    /// Last dispatch timestamp.
    pub last_run_at: Option<DateTime<Utc>>,
    /// Next expected dispatch timestamp.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for lease records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_leases)]
pub struct NewTaskLeaseRow {
    /// Leased task name.
    pub task_name: String,
    /// Per-acquisition identifier.
    pub lease_id: uuid::Uuid,
    /// Holder identity.
    pub owner: String,
    /// Acquisition timestamp.
    pub acquired_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}
