//! Continuous-assessment marks parser
//!
//! The CA marks page holds one `table.table` per course kind. A table is
//! classified by its header cells: an "LT1" column marks a lab table, a "T1"
//! column a theory table. Both kinds start with two header rows.

use scraper::{ElementRef, Html};
use tracing::{debug, error, info, warn};

use crate::error::{PortalError, Result};
use crate::types::{CaMarks, LabMarks, TheoryMarks};

use super::{element_text, selector};

const HEADER_ROWS: usize = 2;
const LAB_COLUMNS: usize = 6;
const THEORY_COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
    Lab,
    Theory,
}

/// Parse a mark cell. Blanks, `*` and anything non-numeric are `None`.
///
/// # Examples
/// ```
/// use studzone_core::parser::parse_mark;
///
/// assert_eq!(parse_mark(" 27.5 "), Some(27.5));
/// assert_eq!(parse_mark("*"), None);
/// assert_eq!(parse_mark("AB"), None);
/// ```
pub fn parse_mark(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "*" {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the CA marks page into lab and theory records.
pub fn parse_marks(html: &str) -> CaMarks {
    let document = Html::parse_document(html);
    let mut marks = CaMarks::default();

    let table_selector = match selector("table.table") {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Marks table selector rejected");
            return marks;
        }
    };

    let mut tables = 0usize;
    for table in document.select(&table_selector) {
        tables += 1;
        match classify_table(&table) {
            Ok(Some(TableKind::Lab)) => parse_rows(&table, LAB_COLUMNS, parse_lab_row, &mut marks.lab),
            Ok(Some(TableKind::Theory)) => {
                parse_rows(&table, THEORY_COLUMNS, parse_theory_row, &mut marks.theory)
            }
            Ok(None) => debug!(table = tables, "Ignoring table without CA headers"),
            Err(e) => warn!(table = tables, error = %e, "Could not classify marks table"),
        }
    }

    if tables == 0 {
        error!("No marks tables found on CA marks page");
        return marks;
    }

    info!(
        lab = marks.lab.len(),
        theory = marks.theory.len(),
        "Parsed CA marks"
    );
    marks
}

fn classify_table(table: &ElementRef) -> Result<Option<TableKind>> {
    let headers: Vec<String> = table
        .select(&selector("th")?)
        .map(|th| th.text().collect::<String>())
        .collect();

    if headers.iter().any(|h| h.contains("LT1")) {
        Ok(Some(TableKind::Lab))
    } else if headers.iter().any(|h| h.contains("T1")) {
        Ok(Some(TableKind::Theory))
    } else {
        Ok(None)
    }
}

fn parse_rows<T>(
    table: &ElementRef,
    min_columns: usize,
    parse_row: fn(&[String]) -> T,
    out: &mut Vec<T>,
) {
    let (row_selector, cell_selector) = match (selector("tr"), selector("td")) {
        (Ok(r), Ok(c)) => (r, c),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Marks row selector rejected");
            return;
        }
    };

    for (index, row) in table.select(&row_selector).enumerate().skip(HEADER_ROWS) {
        let cells: Vec<String> = row.select(&cell_selector).map(|td| element_text(&td)).collect();
        match check_columns(&cells, min_columns) {
            Ok(()) => out.push(parse_row(&cells)),
            Err(e) => warn!(row = index, error = %e, "Skipping marks row"),
        }
    }
}

fn check_columns(cells: &[String], min_columns: usize) -> Result<()> {
    if cells.len() < min_columns {
        return Err(PortalError::RowParse(format!(
            "row has {} columns, expected {}",
            cells.len(),
            min_columns
        )));
    }
    Ok(())
}

fn parse_lab_row(cells: &[String]) -> LabMarks {
    LabMarks {
        subject_code: cells[0].clone(),
        subject_name: cells[1].clone(),
        ca1: parse_mark(&cells[2]),
        ca2: parse_mark(&cells[3]),
        total: parse_mark(&cells[4]),
        converted_total: parse_mark(&cells[5]),
    }
}

fn parse_theory_row(cells: &[String]) -> TheoryMarks {
    TheoryMarks {
        subject_code: cells[0].clone(),
        subject_name: cells[1].clone(),
        t1: parse_mark(&cells[2]),
        t2: parse_mark(&cells[3]),
        retest: parse_mark(&cells[4]),
        retest1: parse_mark(&cells[5]),
        retest2: parse_mark(&cells[6]),
        test_total: parse_mark(&cells[7]),
        assignment: parse_mark(&cells[8]),
        tutorial: parse_mark(&cells[9]),
        total: parse_mark(&cells[10]),
        converted_total: parse_mark(&cells[11]),
    }
}
