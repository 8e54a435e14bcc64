//! Time source for timestamps and "today" checks.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Supplies the current instant and local calendar day.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    /// Local calendar day used by due-date validation.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process-local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one instant.
///
/// `today` is the UTC date of that instant, so results do not depend on the
/// host timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    pub fn set(&mut self, instant: DateTime<Utc>) {
        self.instant = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn today(&self) -> NaiveDate {
        self.instant.date_naive()
    }
}
