//! The slot space: day-pairs, time-slots, and their geometry.
//!
//! The space is closed and defined at compile time. A slot is one
//! (day-pair, time-slot) combination; clients reference slots by key and
//! index only, slots are never persisted as entities.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Number of publish times per day (hourly, 08:00 through 17:00).
pub const TIME_SLOT_COUNT: usize = 10;

/// First publish hour of the day.
const FIRST_HOUR: u32 = 8;

/// A named combination of two publish weekdays per week.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayPair {
    MonWed,
    MonThu,
    TueThu,
    TueFri,
    WedFri,
}

impl DayPair {
    /// Every day-pair, in tie-break order.
    pub const ALL: [DayPair; 5] = [
        DayPair::MonWed,
        DayPair::MonThu,
        DayPair::TueThu,
        DayPair::TueFri,
        DayPair::WedFri,
    ];

    /// The two publish weekdays.
    pub fn days(&self) -> (Weekday, Weekday) {
        match self {
            DayPair::MonWed => (Weekday::Mon, Weekday::Wed),
            DayPair::MonThu => (Weekday::Mon, Weekday::Thu),
            DayPair::TueThu => (Weekday::Tue, Weekday::Thu),
            DayPair::TueFri => (Weekday::Tue, Weekday::Fri),
            DayPair::WedFri => (Weekday::Wed, Weekday::Fri),
        }
    }

    /// Weekday ordinals (0 = Sunday .. 6 = Saturday).
    pub fn day_ordinals(&self) -> (u8, u8) {
        let (a, b) = self.days();
        (weekday_ordinal(a), weekday_ordinal(b))
    }

    /// Stable storage key, e.g. "TUE_THU".
    pub fn key(&self) -> &'static str {
        match self {
            DayPair::MonWed => "MON_WED",
            DayPair::MonThu => "MON_THU",
            DayPair::TueThu => "TUE_THU",
            DayPair::TueFri => "TUE_FRI",
            DayPair::WedFri => "WED_FRI",
        }
    }

    /// Parse from the storage key.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MON_WED" => Some(DayPair::MonWed),
            "MON_THU" => Some(DayPair::MonThu),
            "TUE_THU" => Some(DayPair::TueThu),
            "TUE_FRI" => Some(DayPair::TueFri),
            "WED_FRI" => Some(DayPair::WedFri),
            _ => None,
        }
    }

    /// Human label, e.g. "Monday & Wednesday".
    pub fn label(&self) -> &'static str {
        match self {
            DayPair::MonWed => "Monday & Wednesday",
            DayPair::MonThu => "Monday & Thursday",
            DayPair::TueThu => "Tuesday & Thursday",
            DayPair::TueFri => "Tuesday & Friday",
            DayPair::WedFri => "Wednesday & Friday",
        }
    }

    /// Position in [`DayPair::ALL`], the primary tie-break key.
    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }
}

impl std::fmt::Display for DayPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One assignable (day-pair, time-slot) combination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub day_pair: DayPair,
    pub time_slot: usize,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}",
            self.day_pair.label(),
            time_slot_label(self.time_slot).unwrap_or_else(|| "?".to_string())
        )
    }
}

/// Every day-pair, in tie-break order.
pub fn all_day_pairs() -> &'static [DayPair] {
    &DayPair::ALL
}

/// Every time-slot index, in tie-break order.
pub fn all_time_slots() -> std::ops::Range<usize> {
    0..TIME_SLOT_COUNT
}

/// The full slot space in deterministic order: day-pair ordinal first,
/// then time-slot index.
pub fn slot_space() -> impl Iterator<Item = Slot> {
    all_day_pairs()
        .iter()
        .flat_map(|&day_pair| all_time_slots().map(move |time_slot| Slot { day_pair, time_slot }))
}

/// The publish time for a slot index, None if out of range.
pub fn time_slot_time(index: usize) -> Option<NaiveTime> {
    if index >= TIME_SLOT_COUNT {
        return None;
    }
    NaiveTime::from_hms_opt(FIRST_HOUR + index as u32, 0, 0)
}

/// Human label for a slot index, e.g. "8:00 AM", None if out of range.
pub fn time_slot_label(index: usize) -> Option<String> {
    if index >= TIME_SLOT_COUNT {
        return None;
    }
    let hour24 = FIRST_HOUR + index as u32;
    let (hour12, meridiem) = match hour24 {
        0 => (12, "AM"),
        1..=11 => (hour24, "AM"),
        12 => (12, "PM"),
        _ => (hour24 - 12, "PM"),
    };
    Some(format!("{}:00 {}", hour12, meridiem))
}

/// Weekday ordinal with 0 = Sunday .. 6 = Saturday.
pub fn weekday_ordinal(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Name for a 0 = Sunday .. 6 = Saturday ordinal.
pub fn weekday_name(ordinal: u8) -> &'static str {
    match ordinal {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

/// The next publish datetime for a slot on/after `from`: the earliest date
/// whose weekday is one of the pair, at the slot's publish time.
pub fn next_publish_datetime(slot: Slot, from: NaiveDate) -> Option<NaiveDateTime> {
    let (day1, day2) = slot.day_pair.days();
    let time = time_slot_time(slot.time_slot)?;

    let mut date = from;
    for _ in 0..7 {
        if date.weekday() == day1 || date.weekday() == day2 {
            return Some(date.and_time(time));
        }
        date = date.succ_opt()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_pair_ordinals() {
        assert_eq!(DayPair::MonWed.day_ordinals(), (1, 3));
        assert_eq!(DayPair::TueThu.day_ordinals(), (2, 4));
        assert_eq!(DayPair::WedFri.day_ordinals(), (3, 5));
    }

    #[test]
    fn test_day_pair_key_round_trip() {
        for pair in DayPair::ALL {
            assert_eq!(DayPair::parse(pair.key()), Some(pair));
        }
        assert_eq!(DayPair::parse("SAT_SUN"), None);
    }

    #[test]
    fn test_day_pair_serde_uses_key() {
        let json = serde_json::to_string(&DayPair::TueThu).unwrap();
        assert_eq!(json, "\"TUE_THU\"");
        let back: DayPair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DayPair::TueThu);
    }

    #[test]
    fn test_day_pairs_overlap_on_weekdays() {
        // MON_WED and WED_FRI share Wednesday; this overlap is why
        // conflict detection groups by concrete weekday, not day-pair.
        let (_, wed_a) = DayPair::MonWed.day_ordinals();
        let (wed_b, _) = DayPair::WedFri.day_ordinals();
        assert_eq!(wed_a, wed_b);
    }

    #[test]
    fn test_slot_space_size_and_order() {
        let slots: Vec<Slot> = slot_space().collect();
        assert_eq!(slots.len(), DayPair::ALL.len() * TIME_SLOT_COUNT);
        assert_eq!(
            slots[0],
            Slot {
                day_pair: DayPair::MonWed,
                time_slot: 0
            }
        );
        // Deterministic ascending order
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }

    #[test]
    fn test_time_slot_times() {
        assert_eq!(time_slot_time(0), NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(time_slot_time(9), NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(time_slot_time(10), None);
    }

    #[test]
    fn test_time_slot_labels() {
        assert_eq!(time_slot_label(0).unwrap(), "8:00 AM");
        assert_eq!(time_slot_label(3).unwrap(), "11:00 AM");
        assert_eq!(time_slot_label(4).unwrap(), "12:00 PM");
        assert_eq!(time_slot_label(9).unwrap(), "5:00 PM");
        assert_eq!(time_slot_label(10), None);
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_name(0), "Sunday");
        assert_eq!(weekday_name(3), "Wednesday");
        assert_eq!(weekday_name(6), "Saturday");
    }

    #[test]
    fn test_next_publish_datetime() {
        let slot = Slot {
            day_pair: DayPair::TueThu,
            time_slot: 2, // 10:00
        };
        // 2024-01-01 is a Monday; next Tue/Thu is 2024-01-02
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dt = next_publish_datetime(slot, from).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn test_next_publish_datetime_on_publish_day() {
        let slot = Slot {
            day_pair: DayPair::TueThu,
            time_slot: 0,
        };
        // 2024-01-02 is itself a Tuesday
        let from = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let dt = next_publish_datetime(slot, from).unwrap();
        assert_eq!(dt.date(), from);
    }
}
