use chrono::{NaiveDateTime, Utc};

/// Source of "now" for operation and statement dates, as naive UTC.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// System time in UTC. Local wall time can repeat an hour when DST ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
