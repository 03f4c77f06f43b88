//! Date inputs and wall-clock rendering
//!
//! Query bounds are sent as zone-less wall time (`YYYY-MM-DDTHH:MM:SS`).
//! [`DisplayZone`] decides which wall clock an absolute instant lands on.

use crate::error::{QueryError, QueryResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// `strftime` pattern for query bounds; seconds are always present
pub const WALL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Zone-less layouts accepted for text dates, tried in order
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Zoned layouts beyond RFC 3339 (`+0000` style offsets)
const OFFSET_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Largest accepted fixed offset (exclusive), in seconds
const MAX_OFFSET_SECS: i32 = 86_400;

/// Wall clock used to render absolute instants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    /// Host local time
    #[default]
    Local,
    /// Coordinated universal time
    Utc,
    /// Fixed offset east of UTC, in seconds
    Offset(i32),
}

impl DisplayZone {
    /// Check the zone can render instants
    ///
    /// # Errors
    /// `QueryError::OffsetOutOfRange` for unusable fixed offsets
    pub fn validate(self) -> QueryResult<()> {
        match self {
            Self::Offset(secs) => checked_offset(secs).map(|_| ()),
            Self::Local | Self::Utc => Ok(()),
        }
    }

    /// Wall-clock reading of `instant` in this zone
    ///
    /// # Errors
    /// `QueryError::OffsetOutOfRange` for unusable fixed offsets
    pub fn wall_time(self, instant: DateTime<Utc>) -> QueryResult<NaiveDateTime> {
        match self {
            Self::Local => Ok(instant.with_timezone(&Local).naive_local()),
            Self::Utc => Ok(instant.naive_utc()),
            Self::Offset(secs) => {
                let offset = checked_offset(secs)?;
                Ok(instant.with_timezone(&offset).naive_local())
            }
        }
    }
}

fn checked_offset(secs: i32) -> QueryResult<FixedOffset> {
    FixedOffset::east_opt(secs)
        .filter(|_| secs.abs() < MAX_OFFSET_SECS)
        .ok_or(QueryError::OffsetOutOfRange(secs))
}

/// A `start`/`end` filter value
///
/// Either pre-formatted text or a structured date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateInput {
    /// Text date (RFC 3339, ISO 8601 without zone, or a bare `YYYY-MM-DD`)
    Text(String),
    /// Absolute instant, rendered through the [`DisplayZone`]
    Instant(DateTime<Utc>),
    /// Wall-clock time, rendered as-is
    Wall(NaiveDateTime),
}

impl DateInput {
    /// Resolve to a wall-clock time
    ///
    /// Text carrying an explicit zone is converted into `zone`; zone-less
    /// text is already wall time and is kept untouched.
    ///
    /// # Errors
    /// `QueryError::InvalidDate` for unparsable text
    pub fn to_wall_time(&self, field: &'static str, zone: DisplayZone) -> QueryResult<NaiveDateTime> {
        match self {
            Self::Instant(instant) => zone.wall_time(*instant),
            Self::Wall(wall) => Ok(*wall),
            Self::Text(raw) => parse_text(raw.trim(), zone)
                .ok_or_else(|| QueryError::invalid_date(field, raw.clone()))?,
        }
    }

    /// Render as a query bound (`YYYY-MM-DDTHH:MM:SS`)
    ///
    /// # Errors
    /// `QueryError::InvalidDate` for unparsable text
    pub fn to_query_string(&self, field: &'static str, zone: DisplayZone) -> QueryResult<String> {
        let wall = self.to_wall_time(field, zone)?;
        Ok(wall.format(WALL_TIME_FORMAT).to_string())
    }
}

fn parse_text(raw: &str, zone: DisplayZone) -> Option<QueryResult<NaiveDateTime>> {
    Some(match parse_date_text(raw)? {
        ParsedDate::Instant(instant) => zone.wall_time(instant),
        ParsedDate::Wall(wall) => Ok(wall),
    })
}

/// Text date as written: with a zone it is an instant, without one a wall time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedDate {
    Instant(DateTime<Utc>),
    Wall(NaiveDateTime),
}

/// Parse RFC 3339, ISO 8601 with a `+hhmm` offset, the zone-less layouts,
/// or a bare `YYYY-MM-DD` (midnight)
pub(crate) fn parse_date_text(raw: &str) -> Option<ParsedDate> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedDate::Instant(zoned.with_timezone(&Utc)));
    }
    if let Some(zoned) = OFFSET_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(raw, layout).ok())
    {
        return Some(ParsedDate::Instant(zoned.with_timezone(&Utc)));
    }
    if let Some(wall) = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Some(ParsedDate::Wall(wall));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|day| ParsedDate::Wall(day.and_time(NaiveTime::default())))
}

impl Display for DateInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(raw) => f.write_str(raw),
            Self::Instant(instant) => write!(f, "{}", instant.to_rfc3339()),
            Self::Wall(wall) => write!(f, "{}", wall.format(WALL_TIME_FORMAT)),
        }
    }
}

impl From<&str> for DateInput {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

impl From<String> for DateInput {
    fn from(raw: String) -> Self {
        Self::Text(raw)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(wall: NaiveDateTime) -> Self {
        Self::Wall(wall)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(day: NaiveDate) -> Self {
        Self::Wall(day.and_time(NaiveTime::default()))
    }
}
