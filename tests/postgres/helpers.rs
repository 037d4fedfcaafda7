//! Shared helpers for `PostgreSQL` integration tests.
//!
//! Every test works in its own database cloned from a migrated template, so
//! tests never observe each other's rows.

use chrono::{DateTime, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Connection pool shared by the schedule and resource adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const CREATE_SCHEDULED_TASKS_SQL: &str =
    include_str!("../../migrations/2026-03-01-000001_create_scheduled_tasks/up.sql");

const CREATE_RESOURCES_SQL: &str =
    include_str!("../../migrations/2026-03-01-000002_create_resources/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "stellar_jobs_test_template";

/// Fixed instant the scenarios start from.
pub fn start_of_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a tokio runtime for driving the async adapters.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, eyre::Report> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(eyre::Report::from)
}

/// Ensures the template database exists with every migration applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), eyre::Report> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEDULED_TASKS_SQL)
                .map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_RESOURCES_SQL)
                .map_err(|e| eyre::eyre!("{e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("{e}"))
}

/// Database cloned from the template and dropped with the guard.
///
/// Declare the guard before any pool so the pools close first.
pub struct TestDatabase {
    cluster: &'static TestCluster,
    name: String,
}

impl TestDatabase {
    /// Creates a fresh database whose name starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or the database cannot be created.
    pub fn create(cluster: &'static TestCluster, prefix: &str) -> Result<Self, eyre::Report> {
        ensure_template(cluster)?;
        let name = format!("{prefix}_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("{e}"))?;
        Ok(Self { cluster, name })
    }

    /// Opens a single-connection pool on the database.
    ///
    /// Each call opens an independent pool, so adapters built from separate
    /// pools never share a connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect.
    pub fn pool(&self) -> Result<PgPool, eyre::Report> {
        let url = self.cluster.connection().database_url(&self.name);
        let manager = ConnectionManager::<PgConnection>::new(url);
        Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| eyre::eyre!("{e}"))
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(self.name.as_str()));
    }
}
