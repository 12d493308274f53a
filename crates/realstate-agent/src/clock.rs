//! Calendar source for session validity.

use chrono::NaiveDate;

/// Supplies the current calendar day.
pub trait Clock: Send + Sync {
    /// Today's date in the bot's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process' local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
