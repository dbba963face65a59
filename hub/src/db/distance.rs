use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

use super::query::{date_column, fetch_page, timestamp_column, where_clause};
use super::{DistanceStore, PageRows, SqliteStore};
use crate::error::HubError;
use crate::filters::{DateRange, RecordFilter};

#[derive(Debug, Clone, Serialize)]
pub struct DistanceRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub value: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

const COLUMNS: &str = "id, date, value, created_at, updated_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<DistanceRecord> {
    Ok(DistanceRecord {
        id: row.get(0)?,
        date: date_column(row, 1)?,
        value: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn list_distance(
    conn: &Connection,
    filter: &RecordFilter,
    limit: u32,
    offset: u32,
) -> Result<PageRows<DistanceRecord>, HubError> {
    fetch_page(conn, "distance", COLUMNS, filter, limit, offset, map_row)
}

/// Raw distance samples inside `range`, oldest first.
pub fn distance_samples(
    conn: &Connection,
    range: &DateRange,
) -> Result<Vec<(NaiveDateTime, f64)>, HubError> {
    let wc = where_clause(&RecordFilter::between(*range));
    let sql = format!("SELECT date, value FROM distance{} ORDER BY date ASC, id ASC", wc.sql);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(wc.params.iter()), |row| {
            Ok((timestamp_column(row, 0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl DistanceStore for SqliteStore {
    fn distance_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<DistanceRecord>, HubError> {
        let conn = self.conn()?;
        list_distance(&conn, filter, limit, offset)
    }

    fn distance_samples(&self, range: &DateRange) -> Result<Vec<(NaiveDateTime, f64)>, HubError> {
        let conn = self.conn()?;
        distance_samples(&conn, range)
    }
}
