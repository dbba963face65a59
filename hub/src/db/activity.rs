use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;

use super::query::{date_column, fetch_page, fmt_date, where_clause};
use super::{ActivityStore, PageRows, SqliteStore};
use crate::error::HubError;
use crate::filters::RecordFilter;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub activity_type: String,
    pub hours: f64,
    pub percentage: f64,
    pub date: NaiveDate,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTotal {
    pub activity_type: String,
    pub total_hours: f64,
    pub avg_percentage: f64,
}

const COLUMNS: &str = "id, activity_type, hours, percentage, date, created_at, updated_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    Ok(ActivityRecord {
        id: row.get(0)?,
        activity_type: row.get(1)?,
        hours: row.get(2)?,
        percentage: row.get(3)?,
        date: date_column(row, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn list_activity(
    conn: &Connection,
    filter: &RecordFilter,
    limit: u32,
    offset: u32,
) -> Result<PageRows<ActivityRecord>, HubError> {
    fetch_page(conn, "activity_breakdown", COLUMNS, filter, limit, offset, map_row)
}

/// Hours summed and percentage averaged per activity type.
pub fn activity_totals(
    conn: &Connection,
    filter: &RecordFilter,
) -> Result<Vec<ActivityTotal>, HubError> {
    let wc = where_clause(filter);
    let sql = format!(
        "SELECT activity_type, SUM(hours) AS total_hours, AVG(percentage) AS avg_percentage
         FROM activity_breakdown{}
         GROUP BY activity_type
         ORDER BY activity_type ASC",
        wc.sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(wc.params.iter()), |row| {
            Ok(ActivityTotal {
                activity_type: row.get(0)?,
                total_hours: row.get(1)?,
                avg_percentage: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// All rows recorded on `date`, largest share first.
pub fn activity_on(conn: &Connection, date: NaiveDate) -> Result<Vec<ActivityRecord>, HubError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM activity_breakdown
         WHERE substr(date, 1, 10) = ?
         ORDER BY percentage DESC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![fmt_date(date)], map_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl ActivityStore for SqliteStore {
    fn activity_page(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> Result<PageRows<ActivityRecord>, HubError> {
        let conn = self.conn()?;
        list_activity(&conn, filter, limit, offset)
    }

    fn activity_totals(&self, filter: &RecordFilter) -> Result<Vec<ActivityTotal>, HubError> {
        let conn = self.conn()?;
        activity_totals(&conn, filter)
    }

    fn activity_on(&self, date: NaiveDate) -> Result<Vec<ActivityRecord>, HubError> {
        let conn = self.conn()?;
        activity_on(&conn, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testutil::store_with;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn insert(conn: &Connection, activity: &str, hours: f64, pct: f64, date: &str) {
        conn.execute(
            "INSERT INTO activity_breakdown (activity_type, hours, percentage, date)
             VALUES (?, ?, ?, ?)",
            params![activity, hours, pct, date],
        )
        .unwrap();
    }

    fn fixture(conn: &Connection) {
        insert(conn, "Driving", 8.5, 50.0, "2023-01-01");
        insert(conn, "Idle", 3.2, 20.0, "2023-01-01");
        insert(conn, "Working", 5.7, 30.0, "2023-01-01");
        insert(conn, "Driving", 6.0, 40.0, "2023-01-02");
    }

    #[test]
    fn exact_type_filter() {
        let store = store_with("activity_type", fixture);
        let filter = RecordFilter {
            equals: vec![("activity_type", "Driving".to_string())],
            ..Default::default()
        };
        let (rows, total) = store.activity_page(&filter, 10, 0).unwrap();
        assert_eq!(total, 2);
        assert!(rows.iter().all(|r| r.activity_type == "Driving"));

        let filter = RecordFilter {
            equals: vec![("activity_type", "driving".to_string())],
            ..Default::default()
        };
        assert_eq!(store.activity_page(&filter, 10, 0).unwrap().1, 0);
    }

    #[test]
    fn totals_sum_hours_and_average_percentage() {
        let store = store_with("activity_totals", fixture);
        let totals = store.activity_totals(&RecordFilter::default()).unwrap();
        assert_eq!(totals.len(), 3);
        let driving = totals.iter().find(|t| t.activity_type == "Driving").unwrap();
        assert!((driving.total_hours - 14.5).abs() < 1e-9);
        assert!((driving.avg_percentage - 45.0).abs() < 1e-9);
    }

    #[test]
    fn on_date_orders_by_percentage() {
        let store = store_with("activity_on", fixture);
        let rows = store.activity_on(d("2023-01-01")).unwrap();
        let types: Vec<&str> = rows.iter().map(|r| r.activity_type.as_str()).collect();
        assert_eq!(types, vec!["Driving", "Working", "Idle"]);
        assert!(store.activity_on(d("2023-04-15")).unwrap().is_empty());
    }
}
