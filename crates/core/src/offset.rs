//! Log offsets
//!
//! An [`Offset`] is the logical position of a chunk: the number of
//! nanoseconds since the Unix epoch at the moment the chunk was written.
//! Offsets are totally ordered by their numeric value. They are not
//! guaranteed to be unique; two chunks written within the same nanosecond
//! share an offset and keep their write order.

use crate::error::ParseOffsetError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Position of a chunk within the log, in nanoseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Offset(i64);

impl Offset {
    /// The oldest possible offset.
    ///
    /// Used as a sentinel meaning "earliest available" when loading segments.
    pub const ZERO: Offset = Offset(0);

    /// The newest representable offset. Time conversions saturate here.
    pub const MAX: Offset = Offset(i64::MAX);

    /// Offset for the current wall-clock time.
    pub fn now() -> Self {
        Self::from_time(SystemTime::now())
    }

    /// Offset for the given point in time.
    ///
    /// Times before the epoch yield negative offsets. Times beyond the
    /// range of an `i64` nanosecond count saturate.
    pub fn from_time(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Offset(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)),
            Err(e) => Offset(
                i64::try_from(e.duration().as_nanos())
                    .map(|n| -n)
                    .unwrap_or(i64::MIN),
            ),
        }
    }

    /// Offset for the given UTC timestamp (saturating outside the `i64` range).
    pub fn from_datetime(t: DateTime<Utc>) -> Self {
        match t.timestamp_nanos_opt() {
            Some(n) => Offset(n),
            None if t.timestamp() < 0 => Offset(i64::MIN),
            None => Offset(i64::MAX),
        }
    }

    /// Offset from a raw nanosecond count.
    pub const fn from_nanos(nanos: i64) -> Self {
        Offset(nanos)
    }

    /// Raw nanosecond count.
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// The UTC timestamp this offset was derived from.
    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.0)
    }

    /// Parse a decimal offset, the inverse of `to_string()`.
    pub fn parse(s: &str) -> Result<Self, ParseOffsetError> {
        s.parse()
    }

    /// Whether this is the [`Offset::ZERO`] sentinel.
    pub fn is_zero(self) -> bool {
        self == Offset::ZERO
    }

    /// Whether `self` is strictly older than `other`.
    pub fn is_before(self, other: Offset) -> bool {
        self < other
    }

    /// Whether `self` is strictly newer than `other`.
    pub fn is_after(self, other: Offset) -> bool {
        self > other
    }

    /// Whether `a <= self <= b`.
    pub fn within(self, a: Offset, b: Offset) -> bool {
        a <= self && self <= b
    }

    /// The offset one nanosecond later (saturating).
    pub fn next(self) -> Offset {
        Offset(self.0.saturating_add(1))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Offset {
    type Err = ParseOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Offset).map_err(|source| ParseOffsetError {
            input: s.to_string(),
            source,
        })
    }
}

impl From<SystemTime> for Offset {
    fn from(t: SystemTime) -> Self {
        Offset::from_time(t)
    }
}

impl From<DateTime<Utc>> for Offset {
    fn from(t: DateTime<Utc>) -> Self {
        Offset::from_datetime(t)
    }
}
