use chrono::NaiveDate;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

use super::query::{date_column, fetch_page, where_clause};
use super::{EngineHoursStore, PageRows, SqliteStore};
use crate::error::HubError;
use crate::filters::RecordFilter;

#[derive(Debug, Clone, Serialize)]
pub struct EngineHoursRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub hours: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineHoursPoint {
    pub date: NaiveDate,
    pub hours: f64,
}

const COLUMNS: &str = "id, date, hours, created_at, updated_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<EngineHoursRecord> {
    Ok(EngineHoursRecord {
        id: row.get(0)?,
        date: date_column(row, 1)?,
        hours: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn list_engine_hours(
    conn: &Connection,
    filter: &RecordFilter,
    limit: u32,
    offset: u32,
) -> Result<PageRows<EngineHoursRecord>, HubError> {
    fetch_page(conn, "engine_hours", COLUMNS, filter, limit, offset, map_row)
}

/// Ungrouped `(date, hours)` rows, oldest first.
pub fn engine_hours_series(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<EngineHoursPoint>, HubError> {
    let wc = where_clause(filter);
    let sql = format!(
        "SELECT date, hours FROM engine_hours{} ORDER BY date ASC, id ASC",
        wc.sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(wc.params.iter()), |row| {
            Ok(EngineHoursPoint {
                date: date_column(row, 0)?,
                hours: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl EngineHoursStore for SqliteStore {
    fn engine_hours_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<EngineHoursRecord>, HubError> {
        let conn = self.conn()?;
        list_engine_hours(&conn, filter, limit, offset)
    }

    fn engine_hours_series(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<EngineHoursPoint>, HubError> {
        let conn = self.conn()?;
        engine_hours_series(&conn, filter)
    }
}
