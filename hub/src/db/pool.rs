use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<SqliteConnectionManager>;

/// How long a reader waits on a lock held by the process loading telemetry.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a handler waits for a free pooled connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open the dashboard database read-only behind a small connection pool.
///
/// A missing file is not fatal: the hub still starts and every data request
/// answers with a store error until it is restarted against a real database.
pub fn open_ro_pool(path: &Path, max_size: u32) -> Option<DbPool> {
    if !path.is_file() {
        tracing::warn!("Dashboard DB not found at {}", path.display());
        return None;
    }

    let manager = SqliteConnectionManager::file(path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));

    let size = max_size.max(1);
    Pool::builder()
        .max_size(size)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .inspect(|_| tracing::info!("Dashboard DB {} open ({size} readers)", path.display()))
        .map_err(|e| tracing::error!("Cannot pool dashboard DB {}: {e}", path.display()))
        .ok()
}
