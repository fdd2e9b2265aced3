use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Half-open range of minutes since midnight: `from` inclusive, `to` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteRange {
    pub from: u16,
    pub to: u16,
}

impl MinuteRange {
    pub fn new(from: u16, to: u16) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, minute: u16) -> bool {
        self.from <= minute && minute < self.to
    }

    pub fn is_well_formed(&self) -> bool {
        self.from < self.to && self.to <= MINUTES_PER_DAY
    }
}

impl Display for MinuteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.from / 60,
            self.from % 60,
            self.to / 60,
            self.to % 60
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayHours {
    pub enabled: bool,
    pub ranges: Vec<MinuteRange>,
}

impl DayHours {
    pub fn office() -> Self {
        Self {
            enabled: true,
            ranges: vec![MinuteRange::new(9 * 60, 17 * 60)],
        }
    }

    pub fn off() -> Self {
        Self {
            enabled: false,
            ranges: vec![MinuteRange::new(9 * 60, 17 * 60)],
        }
    }

    fn contains(&self, minute: u16) -> bool {
        self.enabled && self.ranges.iter().any(|range| range.contains(minute))
    }
}

impl Default for DayHours {
    fn default() -> Self {
        Self::office()
    }
}

/// Per-weekday windows during which breaks are scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingHours {
    pub enabled: bool,
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WorkingHours {
    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &DayHours)> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .map(move |weekday| (weekday, self.day(weekday)))
    }

    /// Always true while working hours are disabled.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        if !self.enabled {
            return true;
        }

        let minute = (at.hour() * 60 + at.minute()) as u16;
        self.day(at.weekday()).contains(minute)
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            enabled: false,
            monday: DayHours::office(),
            tuesday: DayHours::office(),
            wednesday: DayHours::office(),
            thursday: DayHours::office(),
            friday: DayHours::office(),
            saturday: DayHours::off(),
            sunday: DayHours::off(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn enabled() -> WorkingHours {
        WorkingHours {
            enabled: true,
            ..WorkingHours::default()
        }
    }

    #[test]
    fn disabled_hours_always_apply() {
        let hours = WorkingHours::default();
        // 2024-06-09 is a Sunday
        assert!(hours.contains(at(2024, 6, 9, 3, 0)));
    }

    #[test]
    fn range_start_is_inclusive_and_end_exclusive() {
        let hours = enabled();
        // 2024-06-10 is a Monday
        assert!(!hours.contains(at(2024, 6, 10, 8, 59)));
        assert!(hours.contains(at(2024, 6, 10, 9, 0)));
        assert!(hours.contains(at(2024, 6, 10, 16, 59)));
        assert!(!hours.contains(at(2024, 6, 10, 17, 0)));
    }

    #[test]
    fn disabled_weekday_never_applies() {
        let hours = enabled();
        assert!(!hours.contains(at(2024, 6, 8, 12, 0)));
    }

    #[test]
    fn multiple_ranges_leave_gaps() {
        let mut hours = enabled();
        hours.tuesday.ranges = vec![MinuteRange::new(8 * 60, 12 * 60), MinuteRange::new(13 * 60, 18 * 60)];
        assert!(hours.contains(at(2024, 6, 11, 11, 30)));
        assert!(!hours.contains(at(2024, 6, 11, 12, 30)));
        assert!(hours.contains(at(2024, 6, 11, 17, 30)));
    }

    #[test]
    fn malformed_ranges_are_detected() {
        assert!(MinuteRange::new(0, MINUTES_PER_DAY).is_well_formed());
        assert!(!MinuteRange::new(600, 600).is_well_formed());
        assert!(!MinuteRange::new(600, MINUTES_PER_DAY + 1).is_well_formed());
    }

    #[test]
    fn ranges_display_as_clock_times() {
        assert_eq!(MinuteRange::new(540, 1050).to_string(), "09:00-17:30");
    }
}
