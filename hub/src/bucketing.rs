//! Adaptive time bucketing for chart series.
//!
//! The granularity is picked from how many calendar days the requested range
//! covers, then raw `(timestamp, value)` rows are summed per bucket:
//!
//! | days covered | granularity | label                      |
//! |--------------|-------------|----------------------------|
//! | 1            | hour        | start date at that hour    |
//! | 2..=30       | day         | the date                   |
//! | 31..=90      | ISO week    | Monday of the ISO week     |
//! | > 90         | month       | first day of the month     |

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::filters::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Thresholds apply to the inclusive day count.  Measured as `end - start`
    /// instead, a difference of 0 is hourly, 1..=29 daily, 30..=89 weekly and
    /// 90 or more monthly.
    pub fn for_range(range: &DateRange) -> Self {
        match range.span_days() {
            ..=1 => Self::Hour,
            2..=30 => Self::Day,
            31..=90 => Self::Week,
            _ => Self::Month,
        }
    }
}

/// Bucket identity.  Within one query every key has the same variant, so the
/// derived ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketKey {
    Hour(u32),
    Day(NaiveDate),
    /// ISO week-year and ISO week number.
    Week(i32, u32),
    Month(i32, u32),
}

/// Representative timestamp of a bucket.  Hour buckets carry a time of day,
/// every other bucket is a plain date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BucketLabel {
    Hour(NaiveDateTime),
    Date(NaiveDate),
}

impl BucketLabel {
    #[cfg(test)]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Hour(dt) => dt.date(),
            Self::Date(d) => *d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: BucketLabel,
    pub value: f64,
}

/// Key and label functions for one query, fixed by the requested range.
#[derive(Debug, Clone, Copy)]
pub struct BucketSpec {
    pub granularity: Granularity,
    anchor: NaiveDate,
}

impl BucketSpec {
    pub fn for_range(range: &DateRange) -> Self {
        Self {
            granularity: Granularity::for_range(range),
            anchor: range.start(),
        }
    }

    pub fn key(&self, ts: NaiveDateTime) -> BucketKey {
        match self.granularity {
            Granularity::Hour => BucketKey::Hour(ts.hour()),
            Granularity::Day => BucketKey::Day(ts.date()),
            Granularity::Week => {
                let week = ts.iso_week();
                BucketKey::Week(week.year(), week.week())
            }
            Granularity::Month => BucketKey::Month(ts.year(), ts.month()),
        }
    }

    pub fn label(&self, key: BucketKey) -> Option<BucketLabel> {
        match key {
            BucketKey::Hour(h) => NaiveTime::from_hms_opt(h, 0, 0)
                .map(|t| BucketLabel::Hour(self.anchor.and_time(t))),
            BucketKey::Day(d) => Some(BucketLabel::Date(d)),
            BucketKey::Week(y, w) => {
                NaiveDate::from_isoywd_opt(y, w, Weekday::Mon).map(BucketLabel::Date)
            }
            BucketKey::Month(y, m) => NaiveDate::from_ymd_opt(y, m, 1).map(BucketLabel::Date),
        }
    }
}

/// Sum `rows` into buckets sized for `range`, ascending by bucket.
///
/// Rows whose calendar date falls outside the range are dropped.  An empty
/// input (or one with nothing in range) yields an empty series.
pub fn bucket<I>(range: &DateRange, rows: I) -> Vec<TimeSeriesPoint>
where
    I: IntoIterator<Item = (NaiveDateTime, f64)>,
{
    let spec = BucketSpec::for_range(range);
    let mut sums: BTreeMap<BucketKey, f64> = BTreeMap::new();
    for (ts, value) in rows {
        if !range.contains(ts.date()) {
            continue;
        }
        *sums.entry(spec.key(ts)).or_insert(0.0) += value;
    }

    sums.into_iter()
        .filter_map(|(key, value)| spec.label(key).map(|date| TimeSeriesPoint { date, value }))
        .collect()
}
