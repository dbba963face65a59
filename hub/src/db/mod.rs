pub mod activity;
pub mod distance;
pub mod engine_hours;
pub mod messages;
pub mod pool;
pub mod query;
pub mod schema;

use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

use crate::error::HubError;
use crate::filters::{DateRange, RecordFilter};
use activity::{ActivityRecord, ActivityTotal};
use distance::DistanceRecord;
use engine_hours::{EngineHoursPoint, EngineHoursRecord};
use messages::{DailyMessageCount, MessageRecord, MessageStatistics, MessageTypeTotal};
use pool::{open_ro_pool, DbPool};

/// One page of rows plus the total matching the filter.
pub type PageRows<T> = (Vec<T>, u64);

// ── Repository traits (one per series) ───────────────────────────────────

pub trait DistanceStore: Send + Sync {
    fn distance_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<DistanceRecord>, HubError>;

    /// Raw `(timestamp, value)` samples inside `range`, oldest first.
    fn distance_samples(&self, range: &DateRange) -> Result<Vec<(NaiveDateTime, f64)>, HubError>;
}

pub trait EngineHoursStore: Send + Sync {
    fn engine_hours_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<EngineHoursRecord>, HubError>;

    fn engine_hours_series(&self, filter: &RecordFilter)
        -> Result<Vec<EngineHoursPoint>, HubError>;
}

pub trait ActivityStore: Send + Sync {
    fn activity_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<ActivityRecord>, HubError>;

    fn activity_totals(&self, filter: &RecordFilter) -> Result<Vec<ActivityTotal>, HubError>;

    fn activity_on(&self, date: NaiveDate) -> Result<Vec<ActivityRecord>, HubError>;
}

pub trait MessageStore: Send + Sync {
    fn messages_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<MessageRecord>, HubError>;

    fn message_totals_by_type(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<MessageTypeTotal>, HubError>;

    fn daily_message_counts(&self, filter: &RecordFilter)
        -> Result<Vec<DailyMessageCount>, HubError>;

    fn message_statistics(&self, latest: u32) -> Result<MessageStatistics, HubError>;
}

// ── SQLite implementation ────────────────────────────────────────────────

/// SQLite-backed store for all four series.  The trait impls live next to
/// each series' queries.
pub struct SqliteStore {
    path: PathBuf,
    pool: Option<DbPool>,
}

impl SqliteStore {
    pub fn open(path: &Path, pool_size: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            pool: open_ro_pool(path, pool_size),
        }
    }

    pub fn from_pool(path: &Path, pool: DbPool) -> Self {
        Self {
            path: path.to_path_buf(),
            pool: Some(pool),
        }
    }

    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>, HubError> {
        let pool = self.pool.as_ref().ok_or_else(|| {
            HubError::Db(format!("db not available: {}", self.path.display()))
        })?;
        Ok(pool.get()?)
    }
}
