//! SQL building shared by the series stores.
//!
//! [`where_clause`] is a pure function of the validated [`RecordFilter`], so the
//! generated SQL can be checked without opening a database.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, Row};

use crate::error::HubError;
use crate::filters::RecordFilter;

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Either empty or starts with `" WHERE "`.
    pub sql: String,
    pub params: Vec<Value>,
}

/// Translate a filter into a `WHERE` fragment over the `date` column plus any
/// exact-match columns.
///
/// The upper bound is `date < <day after until>` so rows stored with a time of
/// day on the last date are still included.
pub fn where_clause(filter: &RecordFilter) -> WhereClause {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(since) = filter.since {
        clauses.push("date >= ?".into());
        params.push(Value::Text(fmt_date(since)));
    }
    if let Some(next) = filter.until.and_then(|u| u.succ_opt()) {
        clauses.push("date < ?".into());
        params.push(Value::Text(fmt_date(next)));
    }
    for (column, value) in &filter.equals {
        clauses.push(format!("{column} = ?"));
        params.push(Value::Text(value.clone()));
    }

    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    WhereClause { sql, params }
}

pub fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Parse a stored `date` value.  Plain dates map to midnight.
pub fn parse_stored_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Read column `idx` as a stored timestamp.
pub fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_stored_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognised date value: {raw}").into(),
        )
    })
}

/// Read column `idx` as a calendar date, dropping any time of day.
pub fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    timestamp_column(row, idx).map(|ts| ts.date())
}

/// Fetch one page of `table` (newest first) together with the filtered total.
pub fn fetch_page<T, F>(
    conn: &Connection,
    table: &str,
    columns: &str,
    filter: &RecordFilter,
    limit: u32,
    offset: u32,
    map: F,
) -> Result<(Vec<T>, u64), HubError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let wc = where_clause(filter);

    let count_sql = format!("SELECT COUNT(*) FROM {table}{}", wc.sql);
    let total: i64 = conn.query_row(&count_sql, params_from_iter(wc.params.iter()), |row| {
        row.get(0)
    })?;

    let data_sql = format!(
        "SELECT {columns} FROM {table}{}
         ORDER BY date DESC, id DESC
         LIMIT ? OFFSET ?",
        wc.sql
    );
    let mut params = wc.params;
    params.push(Value::Integer(i64::from(limit)));
    params.push(Value::Integer(i64::from(offset)));

    let mut stmt = conn.prepare(&data_sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((rows, total.max(0) as u64))
}
