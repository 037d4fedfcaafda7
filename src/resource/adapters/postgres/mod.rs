//! `PostgreSQL` adapters for resource persistence.

mod models;
mod repository;
mod schema;


use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub use repository::PostgresResourceRepository;

/// `PostgreSQL` connection pool type used by resource adapters.
pub type ResourcePgPool = Pool<ConnectionManager<PgConnection>>;
