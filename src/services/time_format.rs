//! Display formatting for timestamps.
//!
//! Timestamps are stored and transported in UTC. They are shown in the
//! user's preferred zone, saved under [`TIMEZONE_KEY`] as an IANA name such
//! as `America/Los_Angeles`, as `UTC`, or as a fixed offset such as `+02:00`.

use super::preferences::{PreferenceStore, TIMEZONE_KEY};
use crate::error::AppError;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Placeholder for missing or unparseable timestamps.
pub const MISSING: &str = "—";

/// A display zone: a named zone with its daylight saving rules, or a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Offset in effect at the given instant.
    pub fn offset_at(&self, ts: DateTime<Utc>) -> FixedOffset {
        match self {
            Self::Named(tz) => tz.offset_from_utc_datetime(&ts.naive_utc()).fix(),
            Self::Fixed(offset) => *offset,
        }
    }
}

impl std::fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(tz) => f.write_str(tz.name()),
            Self::Fixed(offset) if offset.local_minus_utc() == 0 => f.write_str("UTC"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Parse a zone preference.
///
/// Accepts `UTC`, `Z`, `+HH:MM`, `-HH:MM`, `+HHMM` and IANA zone names.
pub fn parse_zone(value: &str) -> Option<DisplayZone> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return Some(DisplayZone::Fixed(Utc.fix()));
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return value.parse::<Tz>().ok().map(DisplayZone::Named),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(DisplayZone::Fixed)
}

/// Formats timestamps in one display zone.
#[derive(Debug, Clone, Copy)]
pub struct TimeFormatter {
    zone: DisplayZone,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimeFormatter {
    pub fn utc() -> Self {
        Self {
            zone: DisplayZone::Fixed(Utc.fix()),
        }
    }

    pub fn with_zone(zone: DisplayZone) -> Self {
        Self { zone }
    }

    /// Read the zone preference; unknown values fall back to UTC.
    pub fn from_store<S: PreferenceStore>(store: &S) -> Self {
        store
            .get(TIMEZONE_KEY)
            .and_then(|value| {
                let zone = parse_zone(&value);
                if zone.is_none() {
                    log::warn!("Ignoring unknown timezone preference {:?}", value);
                }
                zone
            })
            .map(Self::with_zone)
            .unwrap_or_default()
    }

    /// Validate and persist a new zone preference.
    pub fn save_zone<S: PreferenceStore>(store: &S, value: &str) -> Result<Self, AppError> {
        let zone = parse_zone(value)
            .ok_or_else(|| AppError::invalid_input_field("Unknown timezone", "timezone"))?;
        store.set(TIMEZONE_KEY, value.trim())?;
        Ok(Self::with_zone(zone))
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    fn local(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        ts.with_timezone(&self.zone.offset_at(ts))
    }

    /// "Feb 2, 2026"
    pub fn format_date(&self, ts: Option<DateTime<Utc>>) -> String {
        ts.map(|ts| self.local(ts).format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| MISSING.to_string())
    }

    /// "Feb 2, 2026, 10:30 AM"
    pub fn format_date_time(&self, ts: Option<DateTime<Utc>>) -> String {
        ts.map(|ts| {
            self.local(ts)
                .format("%b %-d, %Y, %-I:%M %p")
                .to_string()
        })
        .unwrap_or_else(|| MISSING.to_string())
    }

    /// "10:30 AM"
    pub fn format_time(&self, ts: Option<DateTime<Utc>>) -> String {
        ts.map(|ts| self.local(ts).format("%-I:%M %p").to_string())
            .unwrap_or_else(|| MISSING.to_string())
    }

    /// Relative age for recent timestamps, full date-time after a week.
    pub fn format_relative(&self, ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
        let Some(ts) = ts else {
            return MISSING.to_string();
        };

        let secs = (now - ts).num_seconds();
        let mins = secs / 60;
        let hours = mins / 60;
        let days = hours / 24;

        if secs < 60 {
            "just now".to_string()
        } else if mins < 60 {
            format!("{}m ago", mins)
        } else if hours < 24 {
            format!("{}h ago", hours)
        } else if days < 7 {
            format!("{}d ago", days)
        } else {
            self.format_date_time(Some(ts))
        }
    }
}
