use chrono::{Duration, NaiveDate};
use rand::Rng;
use rusqlite::{params, Connection};

use super::query::fmt_date;
use crate::error::HubError;

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS distance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    value INTEGER NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_distance_date ON distance(date);

CREATE TABLE IF NOT EXISTS engine_hours (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    hours REAL NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_engine_hours_date ON engine_hours(date);

CREATE TABLE IF NOT EXISTS activity_breakdown (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    activity_type TEXT NOT NULL,
    hours REAL NOT NULL,
    percentage REAL NOT NULL,
    date TEXT NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_activity_breakdown_date ON activity_breakdown(date);

CREATE TABLE IF NOT EXISTS messages_received (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    count INTEGER NOT NULL,
    message_type TEXT,
    details TEXT,
    created_at TEXT,
    updated_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_messages_received_date ON messages_received(date);
"#;

pub const ACTIVITY_TYPES: [&str; 5] = ["Driving", "Idle", "Working", "Off", "Maintenance"];
pub const MESSAGE_TYPES: [&str; 5] = ["Alert", "Warning", "Info", "Error", "Status"];

pub fn init_schema(conn: &Connection) -> Result<(), HubError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

fn is_empty(conn: &Connection) -> Result<bool, HubError> {
    let n: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM distance)
              + (SELECT COUNT(*) FROM engine_hours)
              + (SELECT COUNT(*) FROM activity_breakdown)
              + (SELECT COUNT(*) FROM messages_received)",
        [],
        |row| row.get(0),
    )?;
    Ok(n == 0)
}

/// Split 100% across the activity types: every type gets at least 5%, the
/// last one takes the remainder.
fn activity_percentages<R: Rng>(rng: &mut R) -> [i64; 5] {
    let mut out = [0_i64; 5];
    let n = out.len();
    let mut total = 0;
    for (j, slot) in out.iter_mut().enumerate() {
        let pct = if j == n - 1 {
            100 - total
        } else {
            let reserved = (n - j - 1) as i64 * 5;
            let hi = 50.min(100 - total - reserved).max(5);
            rng.gen_range(5..=hi)
        };
        total += pct;
        *slot = pct;
    }
    out
}

/// Fill an empty database with `days` days of demo telemetry ending at `today`.
///
/// Returns the number of days written; 0 when the database already has data.
pub fn seed_demo<R: Rng>(
    conn: &mut Connection,
    today: NaiveDate,
    days: u32,
    rng: &mut R,
) -> Result<u32, HubError> {
    init_schema(conn)?;
    if !is_empty(conn)? {
        tracing::info!("Database already populated; skipping demo seed");
        return Ok(0);
    }

    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let tx = conn.transaction()?;
    for i in (0..days).rev() {
        let date = fmt_date(today - Duration::days(i64::from(i)));

        tx.execute(
            "INSERT INTO distance (date, value, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![date, rng.gen_range(50..=500_i64), stamp, stamp],
        )?;

        let hours = f64::from(rng.gen_range(500..=1200_u32)) / 10.0;
        tx.execute(
            "INSERT INTO engine_hours (date, hours, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![date, hours, stamp, stamp],
        )?;

        for (activity, pct) in ACTIVITY_TYPES.iter().zip(activity_percentages(rng)) {
            let hours = ((pct as f64 / 100.0) * 24.0 * 100.0).round() / 100.0;
            tx.execute(
                "INSERT INTO activity_breakdown
                     (activity_type, hours, percentage, date, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![activity, hours, pct as f64, date, stamp, stamp],
            )?;
        }

        let count = rng.gen_range(5..=50_i64);
        let message_type = MESSAGE_TYPES[rng.gen_range(0..MESSAGE_TYPES.len())];
        tx.execute(
            "INSERT INTO messages_received
                 (date, count, message_type, details, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                date,
                count,
                message_type,
                format!("Generated {count} messages for {date}"),
                stamp,
                stamp
            ],
        )?;
    }
    tx.commit()?;

    tracing::info!("Seeded {days} days of demo data ending {today}");
    Ok(days)
}
