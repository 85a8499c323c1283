//! Studzone Scraper Core Library
//!
//! This crate provides authenticated scraping of the PSG Tech e-campus
//! student portal ("studzone").
//!
//! # Features
//! - Login with anti-forgery token handling and lazy re-login on expiry
//! - Typed parsers for the course plan, attendance, CA marks and timetable pages
//! - Per-page scrapers with a 30-minute in-memory cache
//! - Attendance "bunk" budget and next-class calculations

pub mod cache;
pub mod calc;
pub mod config;
pub mod error;
pub mod parser;
pub mod schedule;
pub mod scraper;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use cache::{TimedCache, DEFAULT_CACHE_TTL};
pub use calc::{available_bunks, BunkReport, BunkStatus, DEFAULT_MIN_ATTENDANCE_PERCENT};
pub use config::{ClientConfig, Credentials, PortalConfig};
pub use error::{PortalError, Result};
pub use schedule::{next_class, period_status, BreakWindow, NextClass, PeriodStatus};
pub use scraper::{
    AttendancePage, AttendanceScraper, CoursePage, CourseScraper, MarksPage, MarksScraper,
    PortalPage, PortalScraper, TimetablePage, TimetableScraper,
};
pub use session::{PortalSession, SessionState};
pub use types::{
    AttendanceRecord, CaMarks, Course, Day, LabMarks, SubjectMarks, TheoryMarks, TimetableEntry,
};
