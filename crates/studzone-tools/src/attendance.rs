//! Attendance lookups and bunk budgets

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use studzone_core::calc::min_attendance_ratio;
use studzone_core::{AttendanceRecord, BunkReport};

use crate::{same_text, SessionManager, ToolError, ToolResult};

/// Attendance totals across all courses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub courses: usize,
    pub total_hours: u64,
    pub present_hours: u64,
    pub absent_hours: u64,
    /// `present / total * 100`, two decimals; 0 when nothing was held
    pub overall_percentage: f64,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let total_hours: u64 = records.iter().map(|r| u64::from(r.total_hours)).sum();
        let present_hours: u64 = records.iter().map(|r| u64::from(r.present_hours)).sum();
        let absent_hours: u64 = records.iter().map(|r| u64::from(r.absent_hours)).sum();
        let overall_percentage = if total_hours == 0 {
            0.0
        } else {
            (present_hours as f64 * 10000.0 / total_hours as f64).round() / 100.0
        };

        Self {
            courses: records.len(),
            total_hours,
            present_hours,
            absent_hours,
            overall_percentage,
        }
    }
}

/// Exact, case-insensitive lookup by course code.
pub fn find_attendance<'a>(records: &'a [AttendanceRecord], code: &str) -> Option<&'a AttendanceRecord> {
    records.iter().find(|r| same_text(&r.course_code, code))
}

fn check_minimum(min_percent: f64) -> ToolResult<()> {
    min_attendance_ratio(min_percent)
        .map(|_| ())
        .map_err(|e| ToolError::InvalidArgument(e.to_string()))
}

fn not_found(code: &str, records: &[AttendanceRecord]) -> ToolError {
    ToolError::NotFound {
        query: code.to_string(),
        available: records.iter().map(|r| r.course_code.clone()).collect(),
    }
}

impl SessionManager {
    pub async fn all_attendance(&self) -> ToolResult<Arc<Vec<AttendanceRecord>>> {
        let records = self.fetch_attendance().await?;
        info!(courses = records.len(), "Listed attendance");
        Ok(records)
    }

    pub async fn attendance_summary(&self) -> ToolResult<AttendanceSummary> {
        let records = self.fetch_attendance().await?;
        Ok(AttendanceSummary::from_records(&records))
    }

    pub async fn subject_attendance(&self, code: &str) -> ToolResult<AttendanceRecord> {
        let records = self.fetch_attendance().await?;
        find_attendance(&records, code)
            .cloned()
            .ok_or_else(|| not_found(code, &records))
    }

    /// Bunk budget of one course at `min_percent` (e.g. 75.0).
    pub async fn subject_bunks(&self, code: &str, min_percent: f64) -> ToolResult<BunkReport> {
        check_minimum(min_percent)?;
        let records = self.fetch_attendance().await?;
        let record = find_attendance(&records, code).ok_or_else(|| not_found(code, &records))?;
        let report = BunkReport::for_record(record, min_percent)?;
        info!(
            course = %report.course_code,
            bunks = report.available_bunks,
            minimum = min_percent,
            "Computed bunk budget"
        );
        Ok(report)
    }

    /// Bunk budgets of every course at `min_percent`.
    pub async fn all_bunks(&self, min_percent: f64) -> ToolResult<Vec<BunkReport>> {
        check_minimum(min_percent)?;
        let records = self.fetch_attendance().await?;
        let reports = records
            .iter()
            .map(|record| BunkReport::for_record(record, min_percent))
            .collect::<studzone_core::Result<Vec<_>>>()?;
        info!(courses = reports.len(), minimum = min_percent, "Computed bunk budgets");
        Ok(reports)
    }
}
