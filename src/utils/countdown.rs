use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt;

/// How often the countdown display is refreshed.
pub const COUNTDOWN_REFRESH: std::time::Duration = std::time::Duration::from_secs(60);

/// Debate start, 2016-03-06 18:00 US Eastern.
pub fn default_countdown_target() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 3, 6, 23, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Whole days, hours and minutes left until a target instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    /// Clamped at zero once `target` is reached.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = target.signed_duration_since(now).max(Duration::zero());

        let days = remaining.num_days();
        let hours = (remaining - Duration::days(days)).num_hours();
        let minutes = (remaining - Duration::days(days) - Duration::hours(hours)).num_minutes();

        Self {
            days,
            hours,
            minutes,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_elapsed() {
            return write!(f, "0");
        }
        write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
    }
}
