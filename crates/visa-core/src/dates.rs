//! Lenient date input for appointment dates and deadlines.
//!
//! Web forms submit dates in several shapes: a full RFC 3339 timestamp from
//! `Date.toISOString()`, a naive datetime from `datetime-local` inputs, or a
//! bare `YYYY-MM-DD` from `date` inputs. All of them are accepted here and
//! normalized to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// A UTC timestamp that deserializes from any of the accepted date formats.
///
/// Accepts:
/// - RFC 3339 with timezone: `2027-01-15T10:30:00Z`
/// - RFC 3339 with offset: `2027-01-15T10:30:00+02:00`
/// - ISO 8601 without timezone (assumes UTC): `2027-01-15T10:30:00`
/// - ISO 8601 without timezone, minute precision: `2027-01-15T10:30`
/// - Date only (assumes midnight UTC): `2027-01-15`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlexibleDateTime(pub DateTime<Utc>);

impl FlexibleDateTime {
    /// Returns the inner DateTime<Utc>
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Deref for FlexibleDateTime {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<FlexibleDateTime> for DateTime<Utc> {
    fn from(dt: FlexibleDateTime) -> Self {
        dt.0
    }
}

impl From<DateTime<Utc>> for FlexibleDateTime {
    fn from(dt: DateTime<Utc>) -> Self {
        FlexibleDateTime(dt)
    }
}

impl fmt::Display for FlexibleDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for FlexibleDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FlexibleDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_flexible_datetime(&s).map_err(de::Error::custom)
    }
}

/// Parse a date string, returning a message listing the accepted formats on failure.
pub fn parse_flexible_datetime(s: &str) -> Result<FlexibleDateTime, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err(
            "Date value cannot be empty. Expected ISO 8601 format (e.g., '2027-01-15T10:30:00Z') or a date (e.g., '2027-01-15')"
                .to_string(),
        );
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(FlexibleDateTime(dt.with_timezone(&Utc)));
    }

    // 2027-01-15T10:30:00
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(FlexibleDateTime(naive.and_utc()));
    }

    // 2027-01-15T10:30:00.123
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(FlexibleDateTime(naive.and_utc()));
    }

    // 2027-01-15T10:30 (datetime-local inputs)
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(FlexibleDateTime(naive.and_utc()));
    }

    if let Ok(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let dt = naive
            .and_hms_opt(0, 0, 0)
            .map(|n| n.and_utc())
            .ok_or_else(|| "Failed to create datetime from date".to_string())?;
        return Ok(FlexibleDateTime(dt));
    }

    // 2027-01-15 10:30:00Z
    let normalized = s.replace(' ', "T");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(FlexibleDateTime(dt.with_timezone(&Utc)));
    }

    Err(format!(
        "Invalid date format: '{}'. Expected ISO 8601 format. \
        Examples: '2027-01-15T10:30:00Z' (with timezone), \
        '2027-01-15T10:30:00' (assumes UTC), \
        '2027-01-15' (date only, midnight UTC)",
        s
    ))
}
