//! Countdown events.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A named moment an in-game event starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownEvent {
    pub name: String,
    pub end_time: DateTime<Utc>,
    pub timestamp_ms: i64,
}

impl CountdownEvent {
    pub fn new(name: impl Into<String>, end_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            end_time,
            timestamp_ms: end_time.timestamp_millis(),
        }
    }

    /// Build from a Unix timestamp in milliseconds.
    pub fn from_millis(name: impl Into<String>, timestamp_ms: i64) -> Option<Self> {
        let end_time = DateTime::from_timestamp_millis(timestamp_ms)?;
        Some(Self {
            name: name.into(),
            end_time,
            timestamp_ms,
        })
    }

    /// Time left until the event, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.end_time - now).max(chrono::Duration::zero())
    }

    /// Live countdown text.
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        let remaining = self.remaining(now);
        if remaining.is_zero() {
            return "Event started!".to_string();
        }

        let days = remaining.num_days();
        let hours = remaining.num_hours() % 24;
        let minutes = remaining.num_minutes() % 60;
        let seconds = remaining.num_seconds() % 60;

        if days > 0 {
            format!("{days}d {hours}h {minutes}m")
        } else {
            format!("{hours}h {minutes}m {seconds}s")
        }
    }
}

/// Interpret a calendar date and wall-clock time in the local zone.
pub fn local_instant(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Placeholder schedule shown when nothing could be fetched.
pub fn fallback_countdowns(now: DateTime<Utc>) -> Vec<CountdownEvent> {
    let today = now.with_timezone(&Local).date_naive();
    let entries = [("Battle Royale", 1, 20), ("Double XP", 3, 12)];

    entries
        .into_iter()
        .filter_map(|(name, days_ahead, hour)| {
            let date = today.checked_add_days(Days::new(days_ahead))?;
            let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
            local_instant(date, time).map(|end| CountdownEvent::new(name, end))
        })
        .collect()
}
