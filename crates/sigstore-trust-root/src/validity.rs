//! Validity windows for trust material

use crate::wire::RawTimeRange;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// A closed time interval during which a key or certificate is trusted
///
/// An absent `start` or `end` leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityPeriod {
    /// First instant of validity
    pub start: Option<DateTime<Utc>>,
    /// Last instant of validity, inclusive
    pub end: Option<DateTime<Utc>>,
}

impl ValidityPeriod {
    /// Create a validity period, rejecting an end before the start
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                return Err(Error::MalformedTrustRoot(format!(
                    "validity period ends ({}) before it starts ({})",
                    format_time(&e),
                    format_time(&s)
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// A period with a start and no end
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// True iff `start <= time` and `time <= end` for whichever bounds exist
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| s <= time) && self.end.map_or(true, |e| time <= e)
    }

    /// Whether the period has an end
    pub fn is_bounded(&self) -> bool {
        self.end.is_some()
    }

    pub(crate) fn from_raw(raw: Option<&RawTimeRange>) -> Result<Self> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };
        Self::new(
            raw.start.as_deref().map(parse_time).transpose()?,
            raw.end.as_deref().map(parse_time).transpose()?,
        )
    }

    pub(crate) fn to_raw(self) -> Option<RawTimeRange> {
        if self.start.is_none() && self.end.is_none() {
            return None;
        }
        Some(RawTimeRange {
            start: self.start.as_ref().map(format_time),
            end: self.end.as_ref().map(format_time),
        })
    }
}

/// Parse an RFC 3339 timestamp, with or without fractional seconds
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::TimeParse(format!("{}: {}", s, e)))
}

/// Format a timestamp the way protobuf JSON does, omitting a zero fraction
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
