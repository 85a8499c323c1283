//! HTML parsers for studzone pages
//!
//! This module contains parsers for extracting data from portal pages:
//! - `login`: Anti-forgery token, login outcome, session-expiry marker
//! - `courses`: Course plan cards
//! - `attendance`: Attendance percentage table
//! - `marks`: Continuous-assessment marks tables
//! - `timetable`: Weekly timetable grid
//!
//! Page parsers never fail: a missing container yields an empty result (logged
//! as an error) and a bad row is skipped (logged as a warning).

pub mod attendance;
pub mod courses;
pub mod login;
pub mod marks;
pub mod timetable;

use scraper::{ElementRef, Selector};

use crate::error::{PortalError, Result};

// Re-export main parsing functions
pub use attendance::{parse_attendance, parse_hours, parse_percentage};
pub use courses::parse_courses;
pub use login::{
    classify_login_outcome, extract_csrf_token, is_login_page, LoginOutcome, CSRF_FIELD, MENU_PATH,
};
pub use marks::{parse_mark, parse_marks};
pub use timetable::{parse_timetable, parse_timetable_cell};

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| PortalError::StructureNotFound(format!("invalid selector {}: {:?}", css, e)))
}

/// Concatenated, trimmed text of an element.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Non-empty trimmed text fragments of an element, in document order.
pub(crate) fn stripped_strings(element: &ElementRef) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The `colspan` of a cell; anything missing or unparsable counts as 1.
pub(crate) fn colspan(element: &ElementRef) -> u8 {
    element
        .value()
        .attr("colspan")
        .and_then(|v| v.trim().parse::<u8>().ok())
        .filter(|&span| span > 0)
        .unwrap_or(1)
}
