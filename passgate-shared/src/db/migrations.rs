/// Embedded database migrations
///
/// Migration files live in `passgate-shared/migrations/` and are compiled
/// into the binary with `sqlx::migrate!`, so a deployed server needs no
/// files on disk to bring its schema up to date.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// Each migration runs in its own transaction; a failure rolls that
/// migration back and is returned to the caller.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations completed");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
