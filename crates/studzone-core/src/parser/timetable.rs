//! Timetable grid parser
//!
//! One row per teaching day: a `th` with the day label followed by period
//! cells. A cell spanning several periods (labs) carries a `colspan` and
//! yields a single entry covering all of them.

use std::sync::OnceLock;

use regex_lite::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, error, info, warn};

use crate::error::{PortalError, Result};
use crate::schedule::{period_times, PERIOD_COUNT};
use crate::types::{Day, TimetableEntry};

use super::{colspan, element_text, selector, stripped_strings};

const TABLE_SELECTORS: [&str; 3] = ["table.timetable-table", "table.table", "table"];

static COURSE_CODE: OnceLock<Option<Regex>> = OnceLock::new();

fn course_code_regex() -> Option<&'static Regex> {
    COURSE_CODE
        .get_or_init(|| Regex::new(r"\b[A-Z]*\d{2}[A-Z]*\d+\b").ok())
        .as_ref()
}

/// Parse the weekly timetable page, ordered by (day, period).
pub fn parse_timetable(html: &str) -> Vec<TimetableEntry> {
    let document = Html::parse_document(html);

    let rows = match timetable_rows(&document) {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Timetable grid missing");
            return Vec::new();
        }
    };
    info!(rows = rows.len(), "Found timetable rows");

    let mut entries = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match parse_day_row(row) {
            Ok(mut day_entries) => entries.append(&mut day_entries),
            Err(e) => warn!(row = index, error = %e, "Skipping timetable row"),
        }
    }

    entries.sort_by_key(|e| (e.day, e.period));
    info!(entries = entries.len(), "Parsed timetable");
    entries
}

fn timetable_rows<'a>(document: &'a Html) -> Result<Vec<ElementRef<'a>>> {
    let mut table = None;
    for css in TABLE_SELECTORS {
        if let Some(found) = document.select(&selector(css)?).next() {
            debug!(selector = css, "Selected timetable table");
            table = Some(found);
            break;
        }
    }
    let table = table.ok_or_else(|| PortalError::StructureNotFound("timetable table".to_string()))?;

    let tbody = table
        .select(&selector("tbody")?)
        .next()
        .ok_or_else(|| PortalError::StructureNotFound("timetable tbody".to_string()))?;
    Ok(tbody.select(&selector("tr")?).collect())
}

fn parse_day_row(row: &ElementRef) -> Result<Vec<TimetableEntry>> {
    let label = row
        .select(&selector("th")?)
        .next()
        .map(|th| element_text(&th))
        .ok_or_else(|| PortalError::RowParse("row has no day header".to_string()))?;
    let day = Day::from_label(&label)
        .ok_or_else(|| PortalError::RowParse(format!("unknown day label {:?}", label)))?;

    let mut entries = Vec::new();
    let mut current: u16 = 1;

    for cell in row.select(&selector("td")?) {
        let span = colspan(&cell);
        let text = element_text(&cell);

        if !text.is_empty() && text != "-" {
            match entry_for_cell(&cell, day, current, span) {
                Some(entry) => {
                    debug!(
                        day = %day,
                        period = entry.period,
                        span,
                        course = %entry.course_code,
                        "Parsed timetable cell"
                    );
                    entries.push(entry);
                }
                None => debug!(day = %day, period = current, "Timetable cell without course"),
            }
        }

        current = current.saturating_add(u16::from(span));
    }

    Ok(entries)
}

fn entry_for_cell(cell: &ElementRef, day: Day, current: u16, span: u8) -> Option<TimetableEntry> {
    let period = match u8::try_from(current) {
        Ok(p) if (1..=PERIOD_COUNT).contains(&p) => p,
        _ => {
            warn!(day = %day, period = current, "Class outside the period table, skipping");
            return None;
        }
    };
    let (course_code, course_name) = parse_timetable_cell(cell)?;
    let (start_time, own_end) = period_times(period)?;

    let last = current.saturating_add(u16::from(span)) - 1;
    let end_time = u8::try_from(last)
        .ok()
        .and_then(period_times)
        .map(|(_, end)| end)
        .unwrap_or(own_end);

    Some(TimetableEntry {
        day,
        period,
        start_time,
        end_time,
        course_code,
        course_name,
        faculty: String::new(),
        room: String::new(),
    })
}

/// Extract `(course_code, course_name)` from a timetable cell.
///
/// The portal renders a `div.tooltip-wrapper` holding the code in a `b` and
/// the full title in `span.tooltip-text`. Cells without the wrapper fall
/// back to spotting a course code in the plain text.
pub fn parse_timetable_cell(cell: &ElementRef) -> Option<(String, String)> {
    let wrapper_selector = selector("div.tooltip-wrapper").ok()?;

    if let Some(wrapper) = cell.select(&wrapper_selector).next() {
        let code = selector("b")
            .ok()
            .and_then(|s| wrapper.select(&s).next())
            .map(|b| element_text(&b))
            .unwrap_or_default();
        let name = selector("span.tooltip-text")
            .ok()
            .and_then(|s| wrapper.select(&s).next())
            .map(|span| element_text(&span))
            .unwrap_or_default();

        if code.is_empty() && name.is_empty() {
            return None;
        }
        return Some((code, name));
    }

    parse_plain_cell(&stripped_strings(cell).join(" "))
}

fn parse_plain_cell(text: &str) -> Option<(String, String)> {
    let re = course_code_regex()?;

    let code = re.find(text).map(|m| m.as_str().to_string()).unwrap_or_default();
    let name = if code.is_empty() {
        text.trim().to_string()
    } else {
        text.replacen(&code, "", 1)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };

    if code.is_empty() && name.is_empty() {
        None
    } else {
        Some((code, name))
    }
}
