#![cfg(test)]
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use migration::MigratorTrait;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Connect to the test database and migrate it once. Returns `None` when no
/// database is reachable so DB-backed tests skip instead of failing.
pub async fn try_db() -> Option<DatabaseConnection> {
    init_tracing();
    let db = match models::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {e}");
            return None;
        }
    };
    let migrated = MIGRATED
        .get_or_init(|| async {
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skip: migrate up failed: {e}");
                    false
                }
            }
        })
        .await;
    if !*migrated {
        return None;
    }
    Some(db)
}

/// Install a compact tracing subscriber for test output. Only the first call
/// wins; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(env_filter).with_target(false).compact().try_init();
}
