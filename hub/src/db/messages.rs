use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;

use super::query::{date_column, fetch_page, where_clause};
use super::{MessageStore, PageRows, SqliteStore};
use crate::error::HubError;
use crate::filters::RecordFilter;

#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub count: i64,
    pub message_type: Option<String>,
    pub details: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageTypeTotal {
    pub message_type: Option<String>,
    pub total_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMessageCount {
    pub date: NaiveDate,
    pub daily_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageTypeCount {
    pub message_type: Option<String>,
    pub type_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageStatistics {
    pub total_messages: i64,
    pub message_types: Vec<MessageTypeCount>,
    pub latest_messages: Vec<MessageRecord>,
}

const COLUMNS: &str = "id, date, count, message_type, details, created_at, updated_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        date: date_column(row, 1)?,
        count: row.get(2)?,
        message_type: row.get(3)?,
        details: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn list_messages(
    conn: &Connection,
    filter: &RecordFilter,
    limit: u32,
    offset: u32,
) -> Result<PageRows<MessageRecord>, HubError> {
    fetch_page(conn, "messages_received", COLUMNS, filter, limit, offset, map_row)
}

pub fn totals_by_type(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<MessageTypeTotal>, HubError> {
    let wc = where_clause(filter);
    let sql = format!(
        "SELECT message_type, SUM(count) AS total_count
         FROM messages_received{}
         GROUP BY message_type
         ORDER BY message_type ASC",
        wc.sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(wc.params.iter()), |row| {
            Ok(MessageTypeTotal {
                message_type: row.get(0)?,
                total_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Message counts summed per calendar day, oldest first.
pub fn daily_counts(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<DailyMessageCount>, HubError> {
    let wc = where_clause(filter);
    let sql = format!(
        "SELECT substr(date, 1, 10) AS day, SUM(count) AS daily_count
         FROM messages_received{}
         GROUP BY day
         ORDER BY day ASC",
        wc.sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(wc.params.iter()), |row| {
            Ok(DailyMessageCount {
                date: date_column(row, 0)?,
                daily_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Overall total, per-type totals (largest first) and the `latest` newest rows.
pub fn statistics(conn: &Connection, latest: u32) -> Result<MessageStatistics, HubError> {
    let total_messages: i64 = conn.query_row(
        "SELECT COALESCE(SUM(count), 0) FROM messages_received",
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT message_type, SUM(count) AS type_count
         FROM messages_received
         GROUP BY message_type
         ORDER BY type_count DESC, message_type ASC",
    )?;
    let message_types = stmt
        .query_map([], |row| {
            Ok(MessageTypeCount {
                message_type: row.get(0)?,
                type_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let sql = format!(
        "SELECT {COLUMNS} FROM messages_received
         ORDER BY date DESC, id DESC
         LIMIT ?"
    );
    let mut stmt = conn.prepare(&sql)?;
    let latest_messages = stmt
        .query_map(params![latest], map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MessageStatistics {
        total_messages,
        message_types,
        latest_messages,
    })
}

impl MessageStore for SqliteStore {
    fn messages_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<MessageRecord>, HubError> {
        let conn = self.conn()?;
        list_messages(&conn, filter, limit, offset)
    }

    fn message_totals_by_type(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<MessageTypeTotal>, HubError> {
        let conn = self.conn()?;
        totals_by_type(&conn, filter)
    }

    fn daily_message_counts(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<DailyMessageCount>, HubError> {
        let conn = self.conn()?;
        daily_counts(&conn, filter)
    }

    fn message_statistics(&self, latest: u32) -> Result<MessageStatistics, HubError> {
        let conn = self.conn()?;
        statistics(&conn, latest)
    }
}
