//! `PostgreSQL` adapters for scheduled task persistence and leasing.

mod lock;
mod models;
mod repository;
mod schema;


use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub use lock::PostgresTaskLock;
pub use repository::PostgresScheduledTaskRepository;

/// `PostgreSQL` connection pool type used by schedule adapters.
pub type SchedulePgPool = Pool<ConnectionManager<PgConnection>>;
