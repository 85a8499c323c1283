//! Bell schedule and next-class lookup
//!
//! The period table is fixed and non-contiguous: three breaks sit between
//! periods. All times are naive local wall-clock times.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::{Day, TimetableEntry};

/// Number of teaching periods per day
pub const PERIOD_COUNT: u8 = 8;

// (period, start, end) as (hour, minute)
const PERIOD_TABLE: [(u8, (u32, u32), (u32, u32)); 8] = [
    (1, (8, 30), (9, 20)),
    (2, (9, 20), (10, 10)),
    (3, (10, 30), (11, 20)),
    (4, (11, 20), (12, 10)),
    (5, (13, 40), (14, 30)),
    (6, (14, 30), (15, 20)),
    (7, (15, 30), (16, 20)),
    (8, (16, 20), (17, 10)),
];

const BREAK_TABLE: [(BreakKind, (u32, u32), (u32, u32)); 3] = [
    (BreakKind::Morning, (10, 10), (10, 30)),
    (BreakKind::Lunch, (12, 10), (13, 40)),
    (BreakKind::Afternoon, (15, 20), (15, 30)),
];

fn hm((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// A teaching period and its wall-clock bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSlot {
    pub period: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// All periods in order.
pub fn periods() -> impl Iterator<Item = PeriodSlot> {
    PERIOD_TABLE.iter().map(|&(period, start, end)| PeriodSlot {
        period,
        start: hm(start),
        end: hm(end),
    })
}

/// Start and end of `period`, or `None` outside 1..=8.
pub fn period_times(period: u8) -> Option<(NaiveTime, NaiveTime)> {
    periods()
        .find(|slot| slot.period == period)
        .map(|slot| (slot.start, slot.end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    Morning,
    Lunch,
    Afternoon,
}

impl BreakKind {
    pub fn label(self) -> &'static str {
        match self {
            BreakKind::Morning => "Morning Break",
            BreakKind::Lunch => "Lunch Break",
            BreakKind::Afternoon => "Afternoon Break",
        }
    }
}

/// A scheduled break between periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakWindow {
    pub kind: BreakKind,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BreakWindow {
    /// Bounds are inclusive.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// All breaks in order.
pub fn break_windows() -> impl Iterator<Item = BreakWindow> {
    BREAK_TABLE.iter().map(|&(kind, start, end)| BreakWindow {
        kind,
        start: hm(start),
        end: hm(end),
    })
}

/// The break containing `time`, if any.
pub fn break_at(time: NaiveTime) -> Option<BreakWindow> {
    break_windows().find(|window| window.contains(time))
}

/// The first break that starts after `time`.
pub fn next_break(time: NaiveTime) -> Option<BreakWindow> {
    break_windows().find(|window| window.start > time)
}

/// What is happening at a given time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodStatus {
    Break(BreakWindow),
    Period { period: u8 },
    Free,
}

impl PeriodStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodStatus::Break(_) => "In Break",
            PeriodStatus::Period { .. } => "In Class",
            PeriodStatus::Free => "Free Time",
        }
    }
}

/// Classify `time`: breaks win over periods, and on a shared boundary the
/// earlier period wins.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use studzone_core::schedule::{period_status, PeriodStatus};
///
/// let t = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
/// assert_eq!(period_status(t), PeriodStatus::Period { period: 3 });
/// ```
pub fn period_status(time: NaiveTime) -> PeriodStatus {
    if let Some(window) = break_at(time) {
        return PeriodStatus::Break(window);
    }

    periods()
        .find(|slot| slot.start <= time && time <= slot.end)
        .map(|slot| PeriodStatus::Period {
            period: slot.period,
        })
        .unwrap_or(PeriodStatus::Free)
}

/// Result of a next-class search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextClass {
    pub entry: TimetableEntry,
    /// 0 for later today, 1 for tomorrow, ...
    pub days_ahead: u32,
    pub starts_at: NaiveDateTime,
    pub minutes_until: i64,
}

impl NextClass {
    fn new(entry: &TimetableEntry, days_ahead: u32, now: NaiveDateTime) -> Self {
        let date = now.date() + Duration::days(i64::from(days_ahead));
        let starts_at = date.and_time(entry.start_time);
        Self {
            entry: entry.clone(),
            days_ahead,
            starts_at,
            minutes_until: (starts_at - now).num_minutes(),
        }
    }
}

/// Entries of `day`, earliest first.
pub fn classes_on(entries: &[TimetableEntry], day: Day) -> Vec<&TimetableEntry> {
    let mut classes: Vec<&TimetableEntry> = entries.iter().filter(|e| e.day == day).collect();
    classes.sort_by_key(|e| (e.start_time, e.period));
    classes
}

/// Find the next class after `now`.
///
/// Later today first (during a break: the first class at or after the break
/// ends), then the first class of each following day in turn. Sundays are
/// skipped, so a week with nothing left rolls over to Monday.
pub fn next_class(entries: &[TimetableEntry], now: NaiveDateTime) -> Option<NextClass> {
    let time = now.time();

    if let Some(today) = Day::from_weekday(now.weekday()) {
        let todays = classes_on(entries, today);
        let found = match break_at(time) {
            Some(window) => todays.into_iter().find(|e| e.start_time >= window.end),
            None => todays.into_iter().find(|e| e.start_time > time),
        };
        if let Some(entry) = found {
            return Some(NextClass::new(entry, 0, now));
        }
    }

    for days_ahead in 1..=7u32 {
        let date = now.date() + Duration::days(i64::from(days_ahead));
        let Some(day) = Day::from_weekday(date.weekday()) else {
            continue;
        };
        if let Some(entry) = classes_on(entries, day).first() {
            return Some(NextClass::new(entry, days_ahead, now));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn entry(day: Day, period: u8, code: &str) -> TimetableEntry {
        let (start_time, end_time) = period_times(period).unwrap();
        TimetableEntry {
            day,
            period,
            start_time,
            end_time,
            course_code: code.to_string(),
            course_name: format!("{} name", code),
            faculty: String::new(),
            room: String::new(),
        }
    }

    // 2024-01-01 was a Monday.
    fn at(day_of_month: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day_of_month)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_period_table_has_gaps() {
        assert_eq!(period_times(2), Some((t(9, 20), t(10, 10))));
        assert_eq!(period_times(3), Some((t(10, 30), t(11, 20))));
        assert_eq!(period_times(5), Some((t(13, 40), t(14, 30))));
        assert_eq!(period_times(0), None);
        assert_eq!(period_times(9), None);
        assert_eq!(periods().count(), usize::from(PERIOD_COUNT));
    }

    #[test]
    fn test_period_status_in_period() {
        assert_eq!(period_status(t(8, 45)), PeriodStatus::Period { period: 1 });
        assert_eq!(period_status(t(16, 30)), PeriodStatus::Period { period: 8 });
    }

    #[test]
    fn test_period_status_shared_boundary_prefers_earlier() {
        assert_eq!(period_status(t(9, 20)), PeriodStatus::Period { period: 1 });
    }

    #[test]
    fn test_period_status_break_wins() {
        match period_status(t(10, 10)) {
            PeriodStatus::Break(window) => assert_eq!(window.kind, BreakKind::Morning),
            other => panic!("Expected break, got {:?}", other),
        }
        match period_status(t(13, 0)) {
            PeriodStatus::Break(window) => {
                assert_eq!(window.kind, BreakKind::Lunch);
                assert_eq!(window.duration_minutes(), 90);
            }
            other => panic!("Expected lunch, got {:?}", other),
        }
    }

    #[test]
    fn test_period_status_free() {
        assert_eq!(period_status(t(7, 0)), PeriodStatus::Free);
        assert_eq!(period_status(t(18, 0)), PeriodStatus::Free);
        assert_eq!(PeriodStatus::Free.label(), "Free Time");
    }

    #[test]
    fn test_next_break() {
        assert_eq!(next_break(t(9, 0)).unwrap().kind, BreakKind::Morning);
        assert_eq!(next_break(t(11, 0)).unwrap().kind, BreakKind::Lunch);
        assert!(next_break(t(16, 0)).is_none());
    }

    #[test]
    fn test_next_class_later_today() {
        let entries = vec![
            entry(Day::Monday, 1, "A"),
            entry(Day::Monday, 4, "B"),
            entry(Day::Monday, 6, "C"),
        ];
        let next = next_class(&entries, at(1, 10, 45)).unwrap();
        assert_eq!(next.entry.course_code, "B");
        assert_eq!(next.days_ahead, 0);
        assert_eq!(next.minutes_until, 35);
    }

    #[test]
    fn test_next_class_during_break() {
        let entries = vec![entry(Day::Monday, 2, "A"), entry(Day::Monday, 5, "B")];
        // Lunch: 12:10-13:40, period 5 starts right at the end of it.
        let next = next_class(&entries, at(1, 12, 30)).unwrap();
        assert_eq!(next.entry.course_code, "B");
        assert_eq!(next.minutes_until, 70);
    }

    #[test]
    fn test_next_class_tomorrow() {
        let entries = vec![entry(Day::Monday, 1, "A"), entry(Day::Tuesday, 3, "B")];
        let next = next_class(&entries, at(1, 17, 30)).unwrap();
        assert_eq!(next.entry.course_code, "B");
        assert_eq!(next.days_ahead, 1);
        assert_eq!(next.starts_at, at(2, 10, 30));
    }

    #[test]
    fn test_next_class_rolls_to_monday() {
        let entries = vec![entry(Day::Monday, 2, "A"), entry(Day::Friday, 8, "B")];
        // Saturday 2024-01-06, nothing on Saturday or Sunday.
        let next = next_class(&entries, at(6, 9, 0)).unwrap();
        assert_eq!(next.entry.course_code, "A");
        assert_eq!(next.days_ahead, 2);
        assert_eq!(next.starts_at, at(8, 9, 20));
    }

    #[test]
    fn test_next_class_on_sunday() {
        let entries = vec![entry(Day::Monday, 1, "A")];
        let next = next_class(&entries, at(7, 20, 0)).unwrap();
        assert_eq!(next.days_ahead, 1);
        assert_eq!(next.entry.course_code, "A");
    }

    #[test]
    fn test_next_class_same_day_next_week() {
        let entries = vec![entry(Day::Wednesday, 1, "A")];
        let next = next_class(&entries, at(3, 12, 0)).unwrap();
        assert_eq!(next.days_ahead, 7);
    }

    #[test]
    fn test_next_class_empty_timetable() {
        assert!(next_class(&[], at(1, 9, 0)).is_none());
    }
}
