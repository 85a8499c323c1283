//! Studzone lookup tools
//!
//! This crate is the query layer that a tool dispatcher (an RPC server, a
//! chat assistant, a CLI) calls into. It owns one scraper per portal page
//! through a [`SessionManager`] and answers typed questions about courses,
//! attendance, marks and the timetable.
//!
//! # Usage
//!
//! ```no_run
//! use studzone_core::PortalConfig;
//! use studzone_tools::SessionManager;
//!
//! # async fn example() -> Result<(), studzone_tools::ToolError> {
//! let manager = SessionManager::new(PortalConfig::from_env()?)?;
//! let report = manager.subject_bunks("20XT81", 75.0).await?;
//! println!("{} bunks left", report.available_bunks);
//! manager.close_session().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Operations
//! - courses: `all_courses`, `search_courses`, `course_details`,
//!   `courses_by_department`, `course_statistics`, `refresh_courses`
//! - attendance: `all_attendance`, `attendance_summary`, `subject_attendance`,
//!   `subject_bunks`, `all_bunks`
//! - marks: `all_marks`, `subject_marks`, `ca_mark`, `all_ca_marks`,
//!   `assignment_marks`, `tutorial_marks`, `list_subjects`
//! - timetable: `schedule_for_day`, `todays_schedule`, `tomorrows_schedule`,
//!   `schedule_from_now`, `weekly_schedule`, `next_class`, `break_schedule`

pub mod attendance;
pub mod courses;
pub mod marks;
pub mod timetable;

use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use studzone_core::{
    AttendanceRecord, AttendanceScraper, CaMarks, Course, CourseScraper, MarksScraper,
    PortalConfig, PortalError, PortalPage, PortalScraper, TimetableEntry, TimetableScraper,
};

pub use attendance::AttendanceSummary;
pub use courses::CourseStatistics;
pub use marks::{CaExam, SubjectKind, SubjectMark, SubjectSummary};
pub use timetable::{BreakSchedule, DaySchedule, NextClassReport, WeeklySchedule};

/// Error type for lookup operations
#[derive(Error, Debug)]
pub enum ToolError {
    /// Fetching or logging in failed; the sessions have been closed
    #[error(transparent)]
    Portal(#[from] PortalError),

    /// Nothing matched the query
    #[error("No match for '{query}'")]
    NotFound {
        query: String,
        /// What could have matched, for the caller to suggest
        available: Vec<String>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Serialize ToolError as its display string
impl Serialize for ToolError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Owns the per-page scrapers behind async mutexes.
///
/// Scrapers are created on first use and share nothing but the config; each
/// logs in with its own session. Any fetch error closes every session so the
/// next call starts from a clean login.
pub struct SessionManager {
    config: PortalConfig,
    courses: Mutex<Option<CourseScraper>>,
    attendance: Mutex<Option<AttendanceScraper>>,
    marks: Mutex<Option<MarksScraper>>,
    timetable: Mutex<Option<TimetableScraper>>,
}

impl SessionManager {
    /// Create a manager. No request is made until the first lookup.
    ///
    /// # Errors
    /// `ToolError::Portal` wrapping a configuration error.
    pub fn new(config: PortalConfig) -> ToolResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            courses: Mutex::new(None),
            attendance: Mutex::new(None),
            marks: Mutex::new(None),
            timetable: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Close and drop every scraper.
    pub async fn close_session(&self) {
        close_slot(&self.courses).await;
        close_slot(&self.attendance).await;
        close_slot(&self.marks).await;
        close_slot(&self.timetable).await;
        info!("All studzone sessions closed");
    }

    /// Number of scrapers currently alive.
    pub async fn active_scrapers(&self) -> usize {
        [
            self.courses.lock().await.is_some(),
            self.attendance.lock().await.is_some(),
            self.marks.lock().await.is_some(),
            self.timetable.lock().await.is_some(),
        ]
        .into_iter()
        .filter(|alive| *alive)
        .count()
    }

    pub(crate) async fn fetch_courses(&self, refresh: bool) -> ToolResult<Arc<Vec<Course>>> {
        self.fetch(&self.courses, refresh).await
    }

    pub(crate) async fn fetch_attendance(&self) -> ToolResult<Arc<Vec<AttendanceRecord>>> {
        self.fetch(&self.attendance, false).await
    }

    pub(crate) async fn fetch_marks(&self) -> ToolResult<Arc<CaMarks>> {
        self.fetch(&self.marks, false).await
    }

    pub(crate) async fn fetch_timetable(&self) -> ToolResult<Arc<Vec<TimetableEntry>>> {
        self.fetch(&self.timetable, false).await
    }

    async fn fetch<P: PortalPage>(
        &self,
        slot: &Mutex<Option<PortalScraper<P>>>,
        refresh: bool,
    ) -> ToolResult<Arc<P::Output>> {
        match self.fetch_locked(slot, refresh).await {
            Ok(payload) => Ok(payload),
            Err(e) => {
                error!(page = P::NAME, error = %e, "Lookup failed, closing sessions");
                self.close_session().await;
                Err(e.into())
            }
        }
    }

    async fn fetch_locked<P: PortalPage>(
        &self,
        slot: &Mutex<Option<PortalScraper<P>>>,
        refresh: bool,
    ) -> studzone_core::Result<Arc<P::Output>> {
        let mut guard = slot.lock().await;
        let scraper = match guard.take() {
            Some(scraper) => scraper,
            None => {
                debug!(page = P::NAME, "Creating scraper");
                PortalScraper::new(self.config.clone())?
            }
        };
        let scraper = guard.insert(scraper);

        if refresh {
            scraper.refresh().await
        } else {
            scraper.fetch_all().await
        }
    }
}

async fn close_slot<P: PortalPage>(slot: &Mutex<Option<PortalScraper<P>>>) {
    if let Some(mut scraper) = slot.lock().await.take() {
        if let Err(e) = scraper.close() {
            warn!(page = P::NAME, error = %e, "Error while closing scraper");
        }
    }
}

/// Case-insensitive, whitespace-trimmed equality.
pub(crate) fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
