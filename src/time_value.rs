use std::fmt;

pub const MAX_HOURS: i64 = 23;
pub const MAX_MINUTES: i64 = 59;
pub const MINUTES_PER_HOUR: i64 = 60;
/// Last minute of the day, 23:59.
pub const MAX_TOTAL_MINUTES: i64 = MAX_HOURS * MINUTES_PER_HOUR + MAX_MINUTES;

/// A time of day with minute precision.
///
/// Always within `0:00..=23:59`; every constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeValue {
    hours: i64,
    minutes: i64,
}

impl TimeValue {
    pub fn new(hours: i64, minutes: i64) -> Self {
        Self {
            hours: clamp_hours(hours),
            minutes: clamp_minutes(minutes),
        }
    }

    /// Parse an `H:mm` / `HH:mm` string.
    ///
    /// Never fails: a missing or unparseable component becomes `0`, and
    /// out-of-range components are clamped.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split(':');
        let hours = parse_component(parts.next());
        let minutes = parse_component(parts.next());
        Self::new(hours, minutes)
    }

    pub fn from_total_minutes(total: i64) -> Self {
        let total = clamp_total_minutes(total);
        Self {
            hours: total / MINUTES_PER_HOUR,
            minutes: total % MINUTES_PER_HOUR,
        }
    }

    pub fn hours(&self) -> i64 {
        self.hours
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn total_minutes(&self) -> i64 {
        self.hours * MINUTES_PER_HOUR + self.minutes
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hours, self.minutes)
    }
}

impl From<&str> for TimeValue {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

fn parse_component(part: Option<&str>) -> i64 {
    part.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Canonical `H:mm` form: hours unpadded, minutes zero-padded.
pub fn format_time(hours: i64, minutes: i64) -> String {
    format!("{}:{:02}", hours, minutes)
}

pub fn clamp_total_minutes(total: i64) -> i64 {
    total.clamp(0, MAX_TOTAL_MINUTES)
}

pub fn clamp_hours(hours: i64) -> i64 {
    hours.clamp(0, MAX_HOURS)
}

pub fn clamp_minutes(minutes: i64) -> i64 {
    minutes.clamp(0, MAX_MINUTES)
}
