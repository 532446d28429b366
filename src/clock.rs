// Source of "now" for the stores. Calendar days are taken in the host's
// local time zone.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    // Local -> FixedOffset (current system offset)
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
