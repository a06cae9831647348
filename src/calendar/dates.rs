//! Canonical publish-date sequencer.
//!
//! Bulk calendars publish on a fixed Tuesday/Thursday pattern. The sequence
//! is a pure function of (start, years_ahead): restartable and reproducible.

use chrono::{Datelike, Months, NaiveDate, NaiveTime, Weekday};

/// Default time-of-day for bulk-generated items, before any per-client
/// override is applied downstream.
pub fn default_publish_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time")
}

/// The first Tuesday or Thursday on/after `date`.
pub fn next_publish_day_on_or_after(date: NaiveDate) -> Option<NaiveDate> {
    let mut day = date;
    for _ in 0..7 {
        if matches!(day.weekday(), Weekday::Tue | Weekday::Thu) {
            return Some(day);
        }
        day = day.succ_opt()?;
    }
    None
}

/// Ordered Tuesday/Thursday dates from the first occurrence on/after
/// `start`, strictly alternating, up to and including `start + years_ahead`
/// years.
pub fn available_dates(start: NaiveDate, years_ahead: u32) -> PublishDates {
    let end = start
        .checked_add_months(Months::new(12 * years_ahead))
        .unwrap_or(start);
    PublishDates {
        next: next_publish_day_on_or_after(start),
        end,
    }
}

/// Iterator over the Tue/Thu publish-date sequence. See [`available_dates`].
#[derive(Debug, Clone)]
pub struct PublishDates {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for PublishDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if current > self.end {
            self.next = None;
            return None;
        }
        self.next = current.succ_opt().and_then(next_publish_day_on_or_after);
        Some(current)
    }
}
