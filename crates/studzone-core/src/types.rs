//! Data types for the studzone scraper
//!
//! All records implement Serialize and Deserialize so the lookup layer can hand
//! them to any transport as JSON.

use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A registered course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course code, e.g. "20XT81"
    pub code: String,
    /// Course title
    pub name: String,
}

/// Attendance figures for one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub course_code: String,
    pub total_hours: u32,
    pub exempted_hours: u32,
    pub absent_hours: u32,
    pub present_hours: u32,
    pub attendance_percentage: f64,
    pub exemption_percentage: f64,
    pub exemption_med_percentage: f64,
    /// Start of the attendance window as printed by the portal
    pub period_from: String,
    /// End of the attendance window as printed by the portal
    pub period_to: String,
    /// Classes that can still be skipped at the default 75% minimum
    pub available_bunks: u32,
}

/// Continuous-assessment marks of a lab course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabMarks {
    pub subject_code: String,
    pub subject_name: String,
    /// CA1 (max 25)
    pub ca1: Option<f64>,
    /// CA2 (max 25)
    pub ca2: Option<f64>,
    /// Total (max 50)
    pub total: Option<f64>,
    /// Converted total (max 60)
    pub converted_total: Option<f64>,
}

/// Continuous-assessment marks of a theory course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryMarks {
    pub subject_code: String,
    pub subject_name: String,
    /// Test 1 (max 30)
    pub t1: Option<f64>,
    /// Test 2 (max 30)
    pub t2: Option<f64>,
    pub retest: Option<f64>,
    pub retest1: Option<f64>,
    pub retest2: Option<f64>,
    pub test_total: Option<f64>,
    /// Assignment / presentation (max 8)
    pub assignment: Option<f64>,
    /// Tutorial (max 12)
    pub tutorial: Option<f64>,
    pub total: Option<f64>,
    /// Converted total (max 40)
    pub converted_total: Option<f64>,
}

/// Everything on the CA marks page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaMarks {
    pub lab: Vec<LabMarks>,
    pub theory: Vec<TheoryMarks>,
}

impl CaMarks {
    pub fn is_empty(&self) -> bool {
        self.lab.is_empty() && self.theory.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lab.len() + self.theory.len()
    }
}

/// Marks of a single subject, tagged by course kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubjectMarks {
    Lab(LabMarks),
    Theory(TheoryMarks),
}

impl SubjectMarks {
    pub fn subject_code(&self) -> &str {
        match self {
            SubjectMarks::Lab(m) => &m.subject_code,
            SubjectMarks::Theory(m) => &m.subject_code,
        }
    }

    pub fn subject_name(&self) -> &str {
        match self {
            SubjectMarks::Lab(m) => &m.subject_name,
            SubjectMarks::Theory(m) => &m.subject_name,
        }
    }
}

/// Teaching day. Sunday never appears on the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All teaching days in week order
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Parse a day label such as "Monday", "MON" or "tue".
    ///
    /// # Examples
    /// ```
    /// use studzone_core::Day;
    ///
    /// assert_eq!(Day::from_label("MON"), Some(Day::Monday));
    /// assert_eq!(Day::from_label(" saturday "), Some(Day::Saturday));
    /// assert_eq!(Day::from_label("Sunday"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Day> {
        let label = label.trim().to_lowercase();
        Day::ALL.into_iter().find(|day| {
            let name = day.name().to_lowercase();
            label == name || label == name[..3]
        })
    }

    pub fn from_weekday(weekday: Weekday) -> Option<Day> {
        match weekday {
            Weekday::Mon => Some(Day::Monday),
            Weekday::Tue => Some(Day::Tuesday),
            Weekday::Wed => Some(Day::Wednesday),
            Weekday::Thu => Some(Day::Thursday),
            Weekday::Fri => Some(Day::Friday),
            Weekday::Sat => Some(Day::Saturday),
            Weekday::Sun => None,
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One scheduled class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub day: Day,
    /// First period the class occupies (1..=8)
    pub period: u8,
    pub start_time: NaiveTime,
    /// End of the last period covered by the cell
    pub end_time: NaiveTime,
    pub course_code: String,
    pub course_name: String,
    /// Not published by the portal's grid view; empty when unknown
    pub faculty: String,
    /// Not published by the portal's grid view; empty when unknown
    pub room: String,
}

impl TimetableEntry {
    /// "HH:MM - HH:MM"
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_from_label_variants() {
        assert_eq!(Day::from_label("Monday"), Some(Day::Monday));
        assert_eq!(Day::from_label("TUE"), Some(Day::Tuesday));
        assert_eq!(Day::from_label("wed"), Some(Day::Wednesday));
        assert_eq!(Day::from_label("  Friday\n"), Some(Day::Friday));
        assert_eq!(Day::from_label("Sun"), None);
        assert_eq!(Day::from_label(""), None);
        assert_eq!(Day::from_label("Day"), None);
    }

    #[test]
    fn test_day_ordering_follows_week() {
        let mut days = vec![Day::Saturday, Day::Monday, Day::Wednesday];
        days.sort();
        assert_eq!(days, vec![Day::Monday, Day::Wednesday, Day::Saturday]);
    }

    #[test]
    fn test_day_weekday_conversion() {
        for day in Day::ALL {
            assert_eq!(Day::from_weekday(day.weekday()), Some(day));
        }
        assert_eq!(Day::from_weekday(Weekday::Sun), None);
    }

    #[test]
    fn test_subject_marks_tagged_serialization() {
        let marks = SubjectMarks::Lab(LabMarks {
            subject_code: "20XT87".to_string(),
            subject_name: "Networks Lab".to_string(),
            ca1: Some(22.0),
            ca2: None,
            total: None,
            converted_total: None,
        });
        let json = serde_json::to_value(&marks).unwrap();
        assert_eq!(json["kind"], "lab");
        assert_eq!(json["subject_code"], "20XT87");
        assert!(json["ca2"].is_null());
    }

    #[test]
    fn test_time_range_format() {
        let entry = TimetableEntry {
            day: Day::Monday,
            period: 1,
            start_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
            course_code: "20XT81".to_string(),
            course_name: "Operating Systems".to_string(),
            faculty: String::new(),
            room: String::new(),
        };
        assert_eq!(entry.time_range(), "08:30 - 09:20");
    }

    #[test]
    fn test_ca_marks_len() {
        let marks = CaMarks::default();
        assert!(marks.is_empty());
        assert_eq!(marks.len(), 0);
    }
}
