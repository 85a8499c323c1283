//! Timetable lookups
//!
//! Everything here takes `now` explicitly so callers decide the clock; the
//! portal runs on naive local time.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::info;

use studzone_core::schedule::{
    self, break_at, break_windows, classes_on, BreakWindow, NextClass, PeriodStatus,
};
use studzone_core::{Day, TimetableEntry};

use crate::{SessionManager, ToolError, ToolResult};

/// Classes of one weekday, earliest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub weekday: Weekday,
    /// Set when the schedule was asked for a concrete date
    pub date: Option<NaiveDate>,
    pub classes: Vec<TimetableEntry>,
    /// "HH:MM - HH:MM" of the first class
    pub first_class: Option<String>,
    pub last_class: Option<String>,
    /// Distinct course codes, sorted
    pub subjects: Vec<String>,
}

impl DaySchedule {
    fn new(weekday: Weekday, date: Option<NaiveDate>, classes: Vec<TimetableEntry>) -> Self {
        let subjects = classes
            .iter()
            .filter(|e| !e.course_code.is_empty())
            .map(|e| e.course_code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            weekday,
            date,
            first_class: classes.first().map(TimetableEntry::time_range),
            last_class: classes.last().map(TimetableEntry::time_range),
            subjects,
            classes,
        }
    }

    pub fn total_classes(&self) -> usize {
        self.classes.len()
    }
}

/// The whole week, Monday to Saturday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub days: Vec<DaySchedule>,
    pub total_classes: usize,
    pub subjects: Vec<String>,
    /// Day with the most classes; the earlier day wins a tie
    pub busiest_day: Option<Day>,
    /// Day with the fewest classes; the earlier day wins a tie
    pub lightest_day: Option<Day>,
}

/// Next class plus what is going on right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextClassReport {
    pub next: Option<NextClass>,
    pub current_status: PeriodStatus,
    /// Minutes until the current break ends
    pub break_minutes_remaining: Option<i64>,
}

/// Break windows and where `now` sits relative to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSchedule {
    pub breaks: Vec<BreakWindow>,
    pub current_break: Option<BreakWindow>,
    pub minutes_remaining: Option<i64>,
    /// Only set when not in a break
    pub next_break: Option<BreakWindow>,
    pub minutes_until_next: Option<i64>,
}

/// Parse a weekday name. Sunday is accepted and simply has no classes.
pub fn parse_weekday(label: &str) -> Option<Weekday> {
    if let Some(day) = Day::from_label(label) {
        return Some(day.weekday());
    }
    match label.trim().to_lowercase().as_str() {
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Classes on `weekday`, earliest first.
pub fn entries_for_day(entries: &[TimetableEntry], weekday: Weekday) -> Vec<TimetableEntry> {
    match Day::from_weekday(weekday) {
        Some(day) => classes_on(entries, day).into_iter().cloned().collect(),
        None => Vec::new(),
    }
}

/// Classes today that start strictly after `now`.
pub fn remaining_today(entries: &[TimetableEntry], now: NaiveDateTime) -> Vec<TimetableEntry> {
    let time = now.time();
    entries_for_day(entries, now.weekday())
        .into_iter()
        .filter(|e| e.start_time > time)
        .collect()
}

pub fn weekly_schedule(entries: &[TimetableEntry]) -> WeeklySchedule {
    let days: Vec<DaySchedule> = Day::ALL
        .iter()
        .map(|day| DaySchedule::new(day.weekday(), None, entries_for_day(entries, day.weekday())))
        .collect();

    let total_classes: usize = days.iter().map(DaySchedule::total_classes).sum();
    let subjects: Vec<String> = days
        .iter()
        .flat_map(|d| d.subjects.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let counts: Vec<(Day, usize)> = Day::ALL
        .iter()
        .copied()
        .zip(days.iter().map(DaySchedule::total_classes))
        .collect();
    let (busiest_day, lightest_day) = if total_classes == 0 {
        (None, None)
    } else {
        (
            first_by(&counts, |count, best| count > best),
            first_by(&counts, |count, best| count < best),
        )
    };

    WeeklySchedule {
        days,
        total_classes,
        subjects,
        busiest_day,
        lightest_day,
    }
}

// First day whose count beats every earlier one under `better`.
fn first_by(counts: &[(Day, usize)], better: impl Fn(usize, usize) -> bool) -> Option<Day> {
    let mut best: Option<(Day, usize)> = None;
    for &(day, count) in counts {
        match best {
            Some((_, best_count)) if !better(count, best_count) => {}
            _ => best = Some((day, count)),
        }
    }
    best.map(|(day, _)| day)
}

fn minutes_between(from: NaiveTime, to: NaiveTime) -> i64 {
    (to - from).num_minutes()
}

pub fn break_schedule(now: NaiveTime) -> BreakSchedule {
    let current_break = break_at(now);
    let next_break = match current_break {
        Some(_) => None,
        None => schedule::next_break(now),
    };

    BreakSchedule {
        breaks: break_windows().collect(),
        minutes_remaining: current_break.map(|w| minutes_between(now, w.end)),
        current_break,
        minutes_until_next: next_break.map(|w| minutes_between(now, w.start)),
        next_break,
    }
}

pub fn next_class_report(entries: &[TimetableEntry], now: NaiveDateTime) -> NextClassReport {
    let current_status = schedule::period_status(now.time());
    let break_minutes_remaining = match current_status {
        PeriodStatus::Break(window) => Some(minutes_between(now.time(), window.end)),
        _ => None,
    };

    NextClassReport {
        next: schedule::next_class(entries, now),
        current_status,
        break_minutes_remaining,
    }
}

impl SessionManager {
    /// Classes of a named weekday ("Monday", "tue", ...).
    pub async fn schedule_for_day(&self, day: &str) -> ToolResult<DaySchedule> {
        let weekday = parse_weekday(day).ok_or_else(|| {
            ToolError::InvalidArgument(format!(
                "invalid day '{}', expected one of Monday..Sunday",
                day
            ))
        })?;
        let entries = self.fetch_timetable().await?;
        let schedule = DaySchedule::new(weekday, None, entries_for_day(&entries, weekday));
        info!(day = %weekday, classes = schedule.total_classes(), "Built day schedule");
        Ok(schedule)
    }

    pub async fn todays_schedule(&self, now: NaiveDateTime) -> ToolResult<DaySchedule> {
        let entries = self.fetch_timetable().await?;
        let date = now.date();
        Ok(DaySchedule::new(
            date.weekday(),
            Some(date),
            entries_for_day(&entries, date.weekday()),
        ))
    }

    pub async fn tomorrows_schedule(&self, now: NaiveDateTime) -> ToolResult<DaySchedule> {
        let entries = self.fetch_timetable().await?;
        let date = now.date() + Duration::days(1);
        Ok(DaySchedule::new(
            date.weekday(),
            Some(date),
            entries_for_day(&entries, date.weekday()),
        ))
    }

    /// Classes left today after `now`.
    pub async fn schedule_from_now(&self, now: NaiveDateTime) -> ToolResult<DaySchedule> {
        let entries = self.fetch_timetable().await?;
        let date = now.date();
        Ok(DaySchedule::new(
            date.weekday(),
            Some(date),
            remaining_today(&entries, now),
        ))
    }

    pub async fn weekly_schedule(&self) -> ToolResult<WeeklySchedule> {
        let entries = self.fetch_timetable().await?;
        let week = weekly_schedule(&entries);
        info!(
            classes = week.total_classes,
            subjects = week.subjects.len(),
            "Built weekly schedule"
        );
        Ok(week)
    }

    pub async fn next_class(&self, now: NaiveDateTime) -> ToolResult<NextClassReport> {
        let entries = self.fetch_timetable().await?;
        let report = next_class_report(&entries, now);
        match &report.next {
            Some(next) => info!(
                course = %next.entry.course_code,
                day = %next.entry.day,
                minutes = next.minutes_until,
                "Found next class"
            ),
            None => info!("No upcoming classes in timetable"),
        }
        Ok(report)
    }

    /// Break windows around `now`. Needs no portal request.
    pub fn break_schedule(&self, now: NaiveTime) -> BreakSchedule {
        break_schedule(now)
    }
}
