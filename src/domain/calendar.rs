//! Calendar-day iteration.
//!
//! Quote feeds skip weekends and holidays, but the analytics here walk every
//! calendar day and let the lookups decide what a gap means.

use chrono::{Days, NaiveDate};

/// Every calendar day from `start` to `end` inclusive. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// The `window` calendar days ending at `date` inclusive, newest first.
///
/// Stops early at the start of the representable calendar.
pub fn trailing_days(date: NaiveDate, window: usize) -> impl Iterator<Item = NaiveDate> {
    (0..window as u64).map_while(move |back| date.checked_sub_days(Days::new(back)))
}
