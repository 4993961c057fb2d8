//! Trading session window, bar interval and cache key.

use crate::domain::error::BarcrossError;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// Daily window of valid trading times, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Session {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, BarcrossError> {
        if open >= close {
            return Err(BarcrossError::invalid(
                "session",
                "open",
                format!("session open {open} must be before close {close}"),
            ));
        }
        Ok(Self { open, close })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let t = ts.time();
        t >= self.open && t <= self.close
    }

    pub fn is_close(&self, ts: NaiveDateTime) -> bool {
        ts.time() == self.close
    }

    /// Session close on the same calendar day as `ts`.
    pub fn close_on(&self, ts: NaiveDateTime) -> NaiveDateTime {
        ts.date().and_time(self.close)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(13, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_session_time(input: &str) -> Result<NaiveTime, BarcrossError> {
    let s = input.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| BarcrossError::Parse {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl IntervalUnit {
    fn seconds(self) -> i64 {
        match self {
            IntervalUnit::Second => 1,
            IntervalUnit::Minute => 60,
            IntervalUnit::Hour => 3_600,
            IntervalUnit::Day => 86_400,
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = BarcrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "s" | "S" | "sec" => Ok(IntervalUnit::Second),
            "min" | "T" | "m" => Ok(IntervalUnit::Minute),
            "h" | "H" => Ok(IntervalUnit::Hour),
            "D" | "d" => Ok(IntervalUnit::Day),
            other => Err(BarcrossError::unsupported("interval unit", other)),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalUnit::Second => write!(f, "s"),
            IntervalUnit::Minute => write!(f, "min"),
            IntervalUnit::Hour => write!(f, "h"),
            IntervalUnit::Day => write!(f, "D"),
        }
    }
}

/// Bucket width: `width` multiples of `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub width: u32,
    pub unit: IntervalUnit,
}

impl Interval {
    pub fn new(width: u32, unit: IntervalUnit) -> Result<Self, BarcrossError> {
        if width == 0 {
            return Err(BarcrossError::invalid(
                "bars",
                "width",
                "interval width must be positive",
            ));
        }
        Ok(Self { width, unit })
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.width as i64 * self.unit.seconds())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.width, self.unit)
    }
}

/// Identity of one aggregated bar artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarKey {
    pub instrument: String,
    pub interval: Interval,
}

impl BarKey {
    pub fn new(instrument: impl Into<String>, interval: Interval) -> Self {
        Self {
            instrument: instrument.into(),
            interval,
        }
    }
}

impl fmt::Display for BarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.instrument, self.interval)
    }
}
