//! Attendance table parser
//!
//! Parses `table#example` on the attendance percentage page. Columns, in
//! order: course code, total, exempted, absent, present, attendance %,
//! exemption %, medical exemption %, from, to.

use scraper::{ElementRef, Html};
use tracing::{debug, error, info, warn};

use crate::calc::{available_bunks, DEFAULT_MIN_ATTENDANCE_RATIO};
use crate::error::{PortalError, Result};
use crate::types::AttendanceRecord;

use super::{element_text, selector};

/// Columns a row must carry
pub const ATTENDANCE_COLUMNS: usize = 10;

/// Parse an hour count; blanks, `*` and anything non-numeric become 0.
///
/// # Examples
/// ```
/// use studzone_core::parser::parse_hours;
///
/// assert_eq!(parse_hours(" 42 "), 42);
/// assert_eq!(parse_hours("*"), 0);
/// assert_eq!(parse_hours("N/A"), 0);
/// ```
pub fn parse_hours(text: &str) -> u32 {
    let text = text.trim();
    if text.is_empty() || text == "*" {
        return 0;
    }
    text.parse().unwrap_or(0)
}

/// Parse a percentage; blanks, `*` and anything non-numeric become 0.0.
pub fn parse_percentage(text: &str) -> f64 {
    let text = text.trim().trim_end_matches('%').trim();
    if text.is_empty() || text == "*" {
        return 0.0;
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse the attendance page into one record per course.
pub fn parse_attendance(html: &str) -> Vec<AttendanceRecord> {
    let document = Html::parse_document(html);

    let rows = match attendance_rows(&document) {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Attendance table missing");
            return Vec::new();
        }
    };
    info!(rows = rows.len(), "Found attendance rows");

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match parse_attendance_row(row) {
            Ok(record) => {
                debug!(
                    course = %record.course_code,
                    present = record.present_hours,
                    total = record.total_hours,
                    "Parsed attendance row"
                );
                records.push(record);
            }
            Err(e) => warn!(row = index, error = %e, "Skipping attendance row"),
        }
    }

    info!(records = records.len(), "Parsed attendance records");
    records
}

fn attendance_rows<'a>(document: &'a Html) -> Result<Vec<ElementRef<'a>>> {
    let table = document
        .select(&selector("table#example")?)
        .next()
        .ok_or_else(|| PortalError::StructureNotFound("table#example".to_string()))?;
    let tbody = table
        .select(&selector("tbody")?)
        .next()
        .ok_or_else(|| PortalError::StructureNotFound("table#example > tbody".to_string()))?;
    Ok(tbody.select(&selector("tr")?).collect())
}

fn parse_attendance_row(row: &ElementRef) -> Result<AttendanceRecord> {
    let cells: Vec<String> = row
        .select(&selector("td")?)
        .map(|cell| element_text(&cell))
        .collect();

    if cells.len() < ATTENDANCE_COLUMNS {
        return Err(PortalError::RowParse(format!(
            "row has {} columns, expected {}",
            cells.len(),
            ATTENDANCE_COLUMNS
        )));
    }

    let course_code = cells[0].clone();
    let total_hours = parse_hours(&cells[1]);
    let present_hours = parse_hours(&cells[4]);

    Ok(AttendanceRecord {
        course_code,
        total_hours,
        exempted_hours: parse_hours(&cells[2]),
        absent_hours: parse_hours(&cells[3]),
        present_hours,
        attendance_percentage: parse_percentage(&cells[5]),
        exemption_percentage: parse_percentage(&cells[6]),
        exemption_med_percentage: parse_percentage(&cells[7]),
        period_from: cells[8].clone(),
        period_to: cells[9].clone(),
        available_bunks: available_bunks(total_hours, present_hours, DEFAULT_MIN_ATTENDANCE_RATIO),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><table id="example"><thead><tr><th>Course</th></tr></thead><tbody>{}</tbody></table></body></html>"#,
            rows
        )
    }

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds)
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("12"), 12);
        assert_eq!(parse_hours(""), 0);
        assert_eq!(parse_hours("-3"), 0);
        assert_eq!(parse_hours("12.5"), 0);
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("80.5"), 80.5);
        assert_eq!(parse_percentage("75 %"), 75.0);
        assert_eq!(parse_percentage("*"), 0.0);
        assert_eq!(parse_percentage("N/A"), 0.0);
    }

    #[test]
    fn test_parse_attendance_row_fields() {
        let html = page(&row(&[
            "20XT81", "40", "0", "8", "32", "80.00", "0", "0", "01-07-2024", "30-09-2024",
        ]));
        let records = parse_attendance(&html);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.course_code, "20XT81");
        assert_eq!(r.total_hours, 40);
        assert_eq!(r.absent_hours, 8);
        assert_eq!(r.present_hours, 32);
        assert_eq!(r.attendance_percentage, 80.0);
        assert_eq!(r.period_from, "01-07-2024");
        assert_eq!(r.period_to, "30-09-2024");
        assert_eq!(r.available_bunks, 2);
    }

    #[test]
    fn test_malformed_number_coerced_to_zero() {
        let html = page(&row(&[
            "20XT82", "N/A", "*", "4", "30", "x", "0", "0", "a", "b",
        ]));
        let records = parse_attendance(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_hours, 0);
        assert_eq!(records[0].exempted_hours, 0);
        assert_eq!(records[0].attendance_percentage, 0.0);
        assert_eq!(records[0].available_bunks, 0);
    }

    #[test]
    fn test_short_row_skipped() {
        let html = page(&format!(
            "{}{}",
            row(&["20XT83", "10", "0"]),
            row(&["20XT84", "20", "0", "2", "18", "90", "0", "0", "a", "b"])
        ));
        let records = parse_attendance(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course_code, "20XT84");
    }

    #[test]
    fn test_row_without_course_code_kept() {
        let html = page(&row(&["", "10", "0", "1", "9", "90", "0", "0", "a", "b"]));
        let records = parse_attendance(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course_code, "");
        assert_eq!(records[0].present_hours, 9);
    }

    #[test]
    fn test_missing_table_is_empty() {
        assert!(parse_attendance("<html><body><table id='other'></table></body></html>").is_empty());
    }

    #[test]
    fn test_table_without_rows_is_empty() {
        assert!(parse_attendance(&page("")).is_empty());
    }
}
