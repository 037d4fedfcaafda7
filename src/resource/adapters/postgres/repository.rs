//! `PostgreSQL` repository implementation for resource storage.

use super::{
    ResourcePgPool,
    models::{ResourceRow, ResourceUpdate},
    schema::resources,
};
use crate::resource::{
    domain::{
        ActorRef, ArtifactPath, GenerationAttempt, PersistedResourceData, Resource, ResourceId,
        ResourceKind, ResourceStatus,
    },
    ports::{ResourceRepository, ResourceRepositoryError, ResourceRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed resource repository.
#[derive(Debug, Clone)]
pub struct PostgresResourceRepository {
    pool: ResourcePgPool,
}

impl PostgresResourceRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ResourcePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ResourceRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ResourceRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ResourceRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ResourceRepositoryError::persistence)?
    }
}

#[async_trait]
impl ResourceRepository for PostgresResourceRepository {
    async fn store(&self, resource: &Resource) -> ResourceRepositoryResult<()> {
        let resource_id = resource.id();
        let row = to_row(resource)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(resources::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ResourceRepositoryError::DuplicateResource(resource_id)
                    }
                    _ => ResourceRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, resource: &Resource) -> ResourceRepositoryResult<Resource> {
        let resource_id = resource.id();
        let expected = resource.version();
        let next_version = expected.saturating_add(1);
        let expected_val = to_db_version(expected)?;
        let changes = to_update(resource, to_db_version(next_version)?)?;

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                resources::table
                    .filter(resources::id.eq(resource_id.into_inner()))
                    .filter(resources::version.eq(expected_val)),
            )
            .set(&changes)
            .execute(connection)
            .map_err(ResourceRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(missing_or_conflict(connection, resource_id, expected));
            }
            Ok(())
        })
        .await?;

        Ok(resource.clone().with_version(next_version))
    }

    async fn delete(&self, resource: &Resource) -> ResourceRepositoryResult<()> {
        let resource_id = resource.id();
        let expected = resource.version();
        let expected_val = to_db_version(expected)?;

        self.run_blocking(move |connection| {
            let deleted_count = diesel::delete(
                resources::table
                    .filter(resources::id.eq(resource_id.into_inner()))
                    .filter(resources::version.eq(expected_val)),
            )
            .execute(connection)
            .map_err(ResourceRepositoryError::persistence)?;
            if deleted_count == 0 {
                return Err(missing_or_conflict(connection, resource_id, expected));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ResourceId) -> ResourceRepositoryResult<Option<Resource>> {
        self.run_blocking(move |connection| {
            let row = resources::table
                .filter(resources::id.eq(id.into_inner()))
                .select(ResourceRow::as_select())
                .first::<ResourceRow>(connection)
                .optional()
                .map_err(ResourceRepositoryError::persistence)?;
            row.map(row_to_resource).transpose()
        })
        .await
    }

    async fn find_by_status(
        &self,
        status: ResourceStatus,
    ) -> ResourceRepositoryResult<Vec<Resource>> {
        let status_val = status.as_str();
        self.run_blocking(move |connection| {
            let rows = resources::table
                .filter(resources::status.eq(status_val))
                .order((resources::created_at.asc(), resources::id.asc()))
                .select(ResourceRow::as_select())
                .load::<ResourceRow>(connection)
                .map_err(ResourceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_resource).collect()
        })
        .await
    }
}

/// Distinguishes a vanished row from a stale version after a guarded write
/// touched nothing.
fn missing_or_conflict(
    connection: &mut PgConnection,
    resource_id: ResourceId,
    expected: u64,
) -> ResourceRepositoryError {
    let exists = diesel::select(diesel::dsl::exists(
        resources::table.filter(resources::id.eq(resource_id.into_inner())),
    ))
    .get_result::<bool>(connection);
    match exists {
        Ok(true) => ResourceRepositoryError::VersionConflict {
            resource_id,
            expected,
        },
        Ok(false) => ResourceRepositoryError::NotFound(resource_id),
        Err(err) => ResourceRepositoryError::persistence(err),
    }
}

fn to_db_version(version: u64) -> ResourceRepositoryResult<i64> {
    i64::try_from(version).map_err(ResourceRepositoryError::persistence)
}

pub(super) fn to_row(resource: &Resource) -> ResourceRepositoryResult<ResourceRow> {
    let attempts =
        serde_json::to_value(resource.attempts()).map_err(ResourceRepositoryError::persistence)?;
    Ok(ResourceRow {
        id: resource.id().into_inner(),
        kind: resource.kind().as_str().to_owned(),
        prompt: resource.prompt().to_owned(),
        submitted_by: resource.submitted_by().as_str().to_owned(),
        status: resource.status().as_str().to_owned(),
        artifact_path: resource.artifact_path().map(|path| path.as_str().to_owned()),
        attempts,
        approver: resource.approver().map(|actor| actor.as_str().to_owned()),
        decided_at: resource.decided_at(),
        rejection_reason: resource.rejection_reason().map(str::to_owned),
        version: to_db_version(resource.version())?,
        created_at: resource.created_at(),
        updated_at: resource.updated_at(),
    })
}

fn to_update(resource: &Resource, version: i64) -> ResourceRepositoryResult<ResourceUpdate> {
    let attempts =
        serde_json::to_value(resource.attempts()).map_err(ResourceRepositoryError::persistence)?;
    Ok(ResourceUpdate {
        status: resource.status().as_str().to_owned(),
        artifact_path: resource.artifact_path().map(|path| path.as_str().to_owned()),
        attempts,
        approver: resource.approver().map(|actor| actor.as_str().to_owned()),
        decided_at: resource.decided_at(),
        rejection_reason: resource.rejection_reason().map(str::to_owned),
        version,
        updated_at: resource.updated_at(),
    })
}

pub(super) fn row_to_resource(row: ResourceRow) -> ResourceRepositoryResult<Resource> {
    let attempts: Vec<GenerationAttempt> =
        serde_json::from_value(row.attempts).map_err(ResourceRepositoryError::persistence)?;
    let data = PersistedResourceData {
        id: ResourceId::from_uuid(row.id),
        kind: ResourceKind::try_from(row.kind.as_str())
            .map_err(ResourceRepositoryError::persistence)?,
        prompt: row.prompt,
        submitted_by: ActorRef::new(row.submitted_by)
            .map_err(ResourceRepositoryError::persistence)?,
        status: ResourceStatus::try_from(row.status.as_str())
            .map_err(ResourceRepositoryError::persistence)?,
        artifact_path: row
            .artifact_path
            .map(ArtifactPath::new)
            .transpose()
            .map_err(ResourceRepositoryError::persistence)?,
        attempts,
        approver: row
            .approver
            .map(ActorRef::new)
            .transpose()
            .map_err(ResourceRepositoryError::persistence)?,
        decided_at: row.decided_at,
        rejection_reason: row.rejection_reason,
        version: u64::try_from(row.version).map_err(ResourceRepositoryError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Resource::from_persisted(data))
}
