//! Database layer for the Hireline backend.
//!
//! Provides repository traits, their PostgreSQL implementations, and the
//! transactional reordering of sequenced collections.

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod repo;
pub mod sequence;

pub use error::{DbError, DbResult};
pub use repo::*;
pub use sequence::{PgSequenceStore, SequenceReorderer, SequenceStore, SequenceTx};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a new database connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Check that the database answers queries.
pub async fn ping(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
