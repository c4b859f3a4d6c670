use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

use crate::configuration::DatabaseSettings;
use crate::db::repository::RepositoryError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn init_pool(settings: &DatabaseSettings) -> Result<PgPool, RepositoryError> {
    let manager = ConnectionManager::<PgConnection>::new(settings.url.as_str());
    let pool = Pool::builder()
        .max_size(settings.pool_size)
        .connection_timeout(Duration::from_secs(settings.timeout_seconds))
        .build(manager)?;

    tracing::info!(pool_size = settings.pool_size, "Postgres connection pool ready");
    Ok(pool)
}

pub fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    let conn = &mut pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::Migration(err.to_string()))?;

    for version in applied {
        tracing::info!(%version, "Applied migration");
    }
    Ok(())
}
