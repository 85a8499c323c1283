//! Per-page scrapers
//!
//! A scraper owns one [`PortalSession`] and one [`TimedCache`]. It fetches a
//! single portal page, parses it and keeps the result for the cache window.
//! The four portal pages differ only in path and parser, so they share
//! [`PortalScraper`] and are told apart by a [`PortalPage`] marker type.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::TimedCache;
use crate::config::PortalConfig;
use crate::error::Result;
use crate::parser::{parse_attendance, parse_courses, parse_marks, parse_timetable};
use crate::session::PortalSession;
use crate::types::{AttendanceRecord, CaMarks, Course, TimetableEntry};

/// A portal page that can be fetched and parsed
pub trait PortalPage {
    /// Parsed form of the page
    type Output: Send + Sync;
    /// Name used in logs
    const NAME: &'static str;
    /// Path below the portal base URL
    const PATH: &'static str;

    fn parse(html: &str) -> Self::Output;
}

/// Course plan page
pub struct CoursePage;

impl PortalPage for CoursePage {
    type Output = Vec<Course>;
    const NAME: &'static str = "courses";
    const PATH: &'static str = "/Attendance/courseplan";

    fn parse(html: &str) -> Self::Output {
        parse_courses(html)
    }
}

/// Attendance percentage page
pub struct AttendancePage;

impl PortalPage for AttendancePage {
    type Output = Vec<AttendanceRecord>;
    const NAME: &'static str = "attendance";
    const PATH: &'static str = "/Attendance/StudentPercentage";

    fn parse(html: &str) -> Self::Output {
        parse_attendance(html)
    }
}

/// Continuous-assessment marks page
pub struct MarksPage;

impl PortalPage for MarksPage {
    type Output = CaMarks;
    const NAME: &'static str = "marks";
    const PATH: &'static str = "/ContinuousAssessment/CAMarksView";

    fn parse(html: &str) -> Self::Output {
        parse_marks(html)
    }
}

/// Weekly timetable page
pub struct TimetablePage;

impl PortalPage for TimetablePage {
    type Output = Vec<TimetableEntry>;
    const NAME: &'static str = "timetable";
    const PATH: &'static str = "/Attendance/TimeTable";

    fn parse(html: &str) -> Self::Output {
        parse_timetable(html)
    }
}

pub type CourseScraper = PortalScraper<CoursePage>;
pub type AttendanceScraper = PortalScraper<AttendancePage>;
pub type MarksScraper = PortalScraper<MarksPage>;
pub type TimetableScraper = PortalScraper<TimetablePage>;

/// Scraper for one portal page
///
/// # Example
/// ```no_run
/// use studzone_core::{AttendanceScraper, PortalConfig};
///
/// # async fn example() -> Result<(), studzone_core::PortalError> {
/// let mut scraper = AttendanceScraper::new(PortalConfig::from_env()?)?;
/// let records = scraper.fetch_all().await?;
/// for record in records.iter() {
///     println!("{}: {}%", record.course_code, record.attendance_percentage);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PortalScraper<P: PortalPage> {
    session: PortalSession,
    cache: TimedCache<P::Output>,
    page: PhantomData<fn() -> P>,
}

impl<P: PortalPage> PortalScraper<P> {
    /// Create a scraper with its own session.
    ///
    /// # Errors
    /// Configuration errors, before any request is made.
    pub fn new(config: PortalConfig) -> Result<Self> {
        Ok(Self::with_session(PortalSession::new(config)?))
    }

    pub fn with_session(session: PortalSession) -> Self {
        Self {
            session,
            cache: TimedCache::new(),
            page: PhantomData,
        }
    }

    /// Override the cache window.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TimedCache::with_ttl(ttl);
        self
    }

    pub fn session(&self) -> &PortalSession {
        &self.session
    }

    /// Parsed page, served from cache while it is fresh.
    pub async fn fetch_all(&mut self) -> Result<Arc<P::Output>> {
        if let Some(cached) = self.cache.get() {
            debug!(page = P::NAME, "Serving from cache");
            return Ok(cached);
        }
        self.refresh().await
    }

    /// Fetch and parse the page regardless of the cache, then store it.
    ///
    /// On error the previous cache entry is left untouched.
    pub async fn refresh(&mut self) -> Result<Arc<P::Output>> {
        info!(page = P::NAME, path = P::PATH, "Fetching page");
        let html = self.session.fetch_page(P::PATH).await?;
        let parsed = P::parse(&html);
        Ok(self.cache.insert(parsed))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Drop the cache and the session cookies.
    pub fn close(&mut self) -> Result<()> {
        self.cache.clear();
        self.session.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, Credentials};

    fn config() -> PortalConfig {
        PortalConfig::with_client(
            Credentials::new("22z201", "secret"),
            ClientConfig::with_base_url("http://127.0.0.1:9/studzone"),
        )
    }

    #[test]
    fn test_page_paths() {
        assert_eq!(CoursePage::PATH, "/Attendance/courseplan");
        assert_eq!(AttendancePage::PATH, "/Attendance/StudentPercentage");
        assert_eq!(MarksPage::PATH, "/ContinuousAssessment/CAMarksView");
        assert_eq!(TimetablePage::PATH, "/Attendance/TimeTable");
    }

    #[test]
    fn test_new_scraper_is_anonymous() {
        let scraper = TimetableScraper::new(config()).unwrap();
        assert!(!scraper.session().is_authenticated());
    }

    #[test]
    fn test_new_scraper_rejects_bad_config() {
        let bad = PortalConfig::new(Credentials::new("22z201", ""));
        assert!(CourseScraper::new(bad).is_err());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_empty() {
        let mut scraper = MarksScraper::new(config()).unwrap();
        assert!(scraper.fetch_all().await.is_err());
        assert!(!scraper.cache.is_populated());
    }

    #[test]
    fn test_close_clears_cache() {
        let mut scraper = CourseScraper::new(config()).unwrap();
        scraper.cache.insert(Vec::new());
        scraper.close().unwrap();
        assert!(!scraper.cache.is_populated());
    }
}
