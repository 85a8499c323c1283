//! Attendance arithmetic
//!
//! The bunk budget is computed from the current totals only. It approximates
//! how many more absences fit before the percentage dips under the minimum;
//! it is not a projection of the rest of the semester.

use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};
use crate::types::AttendanceRecord;

/// Minimum attendance ratio enforced by the institution
pub const DEFAULT_MIN_ATTENDANCE_RATIO: f64 = 0.75;

/// Same threshold expressed as a percentage
pub const DEFAULT_MIN_ATTENDANCE_PERCENT: f64 = 75.0;

// Absorbs float noise such as 1.9999999 before flooring.
const EPSILON: f64 = 1e-9;

/// Number of classes that can still be skipped.
///
/// `floor((present - r * total) / r)`, or 0 when already below `r * total`.
///
/// # Examples
/// ```
/// use studzone_core::calc::available_bunks;
///
/// assert_eq!(available_bunks(40, 32, 0.75), 2);
/// assert_eq!(available_bunks(40, 29, 0.75), 0);
/// assert_eq!(available_bunks(0, 0, 0.75), 0);
/// ```
pub fn available_bunks(total_hours: u32, present_hours: u32, min_ratio: f64) -> u32 {
    if total_hours == 0 || min_ratio <= 0.0 {
        return 0;
    }

    let required = min_ratio * f64::from(total_hours);
    let present = f64::from(present_hours);
    if present < required {
        return 0;
    }

    let bunks = ((present - required) / min_ratio + EPSILON).floor();
    bunks.max(0.0) as u32
}

/// Convert a percentage such as `75.0` into a ratio.
///
/// # Errors
/// `PortalError::Config` unless `0 < percent <= 100`.
pub fn min_attendance_ratio(percent: f64) -> Result<f64> {
    if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
        return Err(PortalError::Config(format!(
            "minimum attendance must be within (0, 100], got {}",
            percent
        )));
    }
    Ok(percent / 100.0)
}

/// Where a course stands against the minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BunkStatus {
    BelowMinimum,
    AtMinimum,
    SafeToBunk,
}

/// Bunk budget of one course at a given minimum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BunkReport {
    pub course_code: String,
    pub available_bunks: u32,
    pub status: BunkStatus,
    pub minimum_percent: f64,
    pub current_percent: f64,
    pub present_hours: u32,
    pub absent_hours: u32,
    pub total_hours: u32,
    /// `r * total_hours`
    pub required_present_hours: f64,
    /// `present_hours - required_present_hours`, negative when below minimum
    pub surplus_hours: f64,
}

impl BunkReport {
    /// Build the report for `record` at `minimum_percent`.
    pub fn for_record(record: &AttendanceRecord, minimum_percent: f64) -> Result<Self> {
        let ratio = min_attendance_ratio(minimum_percent)?;
        let required = ratio * f64::from(record.total_hours);
        let surplus = f64::from(record.present_hours) - required;
        let bunks = available_bunks(record.total_hours, record.present_hours, ratio);

        let status = if surplus < 0.0 {
            BunkStatus::BelowMinimum
        } else if bunks == 0 {
            BunkStatus::AtMinimum
        } else {
            BunkStatus::SafeToBunk
        };

        Ok(Self {
            course_code: record.course_code.clone(),
            available_bunks: bunks,
            status,
            minimum_percent,
            current_percent: record.attendance_percentage,
            present_hours: record.present_hours,
            absent_hours: record.absent_hours,
            total_hours: record.total_hours,
            required_present_hours: required,
            surplus_hours: surplus,
        })
    }
}
