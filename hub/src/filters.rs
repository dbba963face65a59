//! Request filter parsing and validation.
//!
//! Query strings are deserialized into [`FilterQuery`] as raw strings and then
//! validated into a [`RecordFilter`] or [`DateRange`] before any store access.
//! Validation failures collect field-level messages into [`FieldErrors`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::HubError;

static ROUTE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("route date pattern"));
static DUPLICATE_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"duplicate field `(\w+)`").expect("duplicate field pattern"));

// ── Field errors ─────────────────────────────────────────────────────────

/// Validation messages keyed by field name, serialized as `{field: [messages]}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// ── Date range ───────────────────────────────────────────────────────────

/// Inclusive calendar date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends (a single day is 1).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ── Record filter ────────────────────────────────────────────────────────

/// Validated filter passed to the record stores.
///
/// `equals` holds `(column, value)` pairs for exact-match categorical filters.
/// Column names always come from code, never from the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub equals: Vec<(&'static str, String)>,
}

impl RecordFilter {
    pub fn between(range: DateRange) -> Self {
        Self {
            since: Some(range.start()),
            until: Some(range.end()),
            equals: Vec::new(),
        }
    }
}

/// Categorical query parameter an endpoint accepts, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    None,
    ActivityType,
    MessageType,
}

// ── Query params ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl FilterQuery {
    /// Validate optional date bounds plus the endpoint's categorical filter.
    pub fn record_filter(&self, category: Category) -> Result<RecordFilter, HubError> {
        let mut errors = FieldErrors::default();
        let since = optional_date(&mut errors, "start_date", self.start_date.as_deref());
        let until = optional_date(&mut errors, "end_date", self.end_date.as_deref());
        check_order(&mut errors, since, until);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let mut equals = Vec::new();
        match category {
            Category::ActivityType => {
                if let Some(v) = present(self.activity_type.as_deref()) {
                    equals.push(("activity_type", v.to_string()));
                }
            }
            Category::MessageType => {
                if let Some(v) = present(self.message_type.as_deref()) {
                    equals.push(("message_type", v.to_string()));
                }
            }
            Category::None => {}
        }

        Ok(RecordFilter {
            since,
            until,
            equals,
        })
    }

    /// Validate a range where both bounds are mandatory.
    pub fn required_range(&self) -> Result<DateRange, HubError> {
        let mut errors = FieldErrors::default();
        let start = required_date(&mut errors, "start_date", self.start_date.as_deref());
        let end = required_date(&mut errors, "end_date", self.end_date.as_deref());
        check_order(&mut errors, start, end);

        match (start, end) {
            (Some(s), Some(e)) if errors.is_empty() => {
                DateRange::new(s, e).ok_or_else(|| HubError::Internal("unordered range".into()))
            }
            _ => Err(errors.into()),
        }
    }

    /// Requested page number; anything unparseable or below 1 means page 1.
    pub fn page(&self) -> u32 {
        present(self.page.as_deref())
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// Validate a `{date}` path segment: strict `YYYY-MM-DD` naming a real day.
pub fn route_date(raw: &str) -> Result<NaiveDate, HubError> {
    let parsed = ROUTE_DATE_RE
        .is_match(raw)
        .then(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .flatten();
    parsed.ok_or_else(|| {
        let mut errors = FieldErrors::default();
        errors.add("date", "The date must be a valid date in YYYY-MM-DD format.");
        errors.into()
    })
}

/// Field errors for a query string that could not be read into [`FilterQuery`],
/// given the extractor's description of the failure.
pub fn malformed_query(detail: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    match DUPLICATE_FIELD_RE.captures(detail).and_then(|c| c.get(1)) {
        Some(field) => {
            let field = field.as_str();
            errors.add(field, format!("The {} field must be given only once.", label(field)));
        }
        None => errors.add("query", "The query string is malformed."),
    }
    errors
}

/// Parse a query-string date.  Time-of-day suffixes are accepted and dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn optional_date(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = present(raw)?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.add(field, format!("The {} is not a valid date.", label(field)));
    }
    parsed
}

fn required_date(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    if present(raw).is_none() {
        errors.add(field, format!("The {} field is required.", label(field)));
        return None;
    }
    optional_date(errors, field, raw)
}

fn check_order(errors: &mut FieldErrors, start: Option<NaiveDate>, end: Option<NaiveDate>) {
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            errors.add(
                "end_date",
                "The end date must be a date after or equal to start date.",
            );
        }
    }
}
