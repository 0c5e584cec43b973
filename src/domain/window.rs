// Lookback windows for reservation-derived counters
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    Week,
    #[default]
    Month,
}

impl TimeWindow {
    pub fn lookback(self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    /// Inclusive `[start, end]` bounds anchored at `now`.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.lookback(), now)
    }

    pub fn contains(self, now: DateTime<Utc>, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds(now);
        instant >= start && instant <= end
    }
}
