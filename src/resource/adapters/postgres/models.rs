//! Diesel row models for resource persistence.

use super::schema::resources;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for resource records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResourceRow {
    /// Resource identifier.
    pub id: uuid::Uuid,
    /// Resource kind.
    pub kind: String,
    /// Generation prompt.
    pub prompt: String,
    /// Submitting actor.
    pub submitted_by: String,
    /// Lifecycle status.
    pub status: String,
    /// Artifact path.
    pub artifact_path: Option<String>,
    /// Failed attempts JSON array.
    pub attempts: Value,
    /// Deciding approver.
    pub approver: Option<String>,
    /// Decision timestamp.
    pub decided_at: Option<DateTime<Utc>>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Optimistic concurrency token.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the mutable resource columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = resources)]
#[diesel(treat_none_as_null = true)]
pub struct ResourceUpdate {
    /// Lifecycle status.
    pub status: String,
    /// Artifact path.
    pub artifact_path: Option<String>,
    /// Failed attempts JSON array.
    pub attempts: Value,
    /// Deciding approver.
    pub approver: Option<String>,
    /// Decision timestamp.
    pub decided_at: Option<DateTime<Utc>>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Next concurrency token.
    pub version: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
