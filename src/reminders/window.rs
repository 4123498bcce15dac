use chrono::{DateTime, Duration, NaiveDate, Utc};

/// The look-ahead band a booking must start in to be reminded on this run.
///
/// With the defaults this is `[now + 71h, now + 73h]`, both ends inclusive.
/// The band is two hours wide so an hourly trigger sees every booking inside
/// it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub now: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReminderWindow {
    pub fn new(now: DateTime<Utc>, lead: Duration, tolerance: Duration) -> Self {
        Self {
            now,
            start: now + (lead - tolerance),
            end: now + (lead + tolerance),
        }
    }

    /// Calendar dates of the two bounds.
    ///
    /// Bookings are stored by date, so the store is first asked for these two
    /// days. The result is a superset of what [`contains`](Self::contains)
    /// accepts.
    pub fn candidate_dates(&self) -> [NaiveDate; 2] {
        [self.start.date_naive(), self.end.date_naive()]
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// Fractional hours from the window's `now` until `at`
    pub fn hours_until(&self, at: DateTime<Utc>) -> f64 {
        (at - self.now).num_milliseconds() as f64 / 3_600_000.0
    }
}
