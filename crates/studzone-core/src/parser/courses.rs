//! Course plan parser
//!
//! The course plan page renders one `div.card` per registered course. The
//! first two text fragments of a card are the course code and its title.

use std::collections::BTreeMap;

use scraper::Html;
use tracing::{debug, error, info};

use crate::types::Course;

use super::{selector, stripped_strings};

/// Parse the course plan page.
///
/// Cards sharing a code collapse into one course; the last card wins.
pub fn parse_courses(html: &str) -> Vec<Course> {
    let document = Html::parse_document(html);
    let card_selector = match selector("div.card") {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Course card selector rejected");
            return Vec::new();
        }
    };

    let mut by_code: BTreeMap<String, String> = BTreeMap::new();
    let mut cards = 0usize;

    for card in document.select(&card_selector) {
        cards += 1;
        let fragments = stripped_strings(&card);
        let mut fragments = fragments.into_iter();
        match (fragments.next(), fragments.next()) {
            (Some(code), Some(name)) => {
                by_code.insert(code, name);
            }
            _ => debug!(card = cards, "Course card has fewer than two text fragments"),
        }
    }

    if cards == 0 {
        error!("No course cards found on course plan page");
        return Vec::new();
    }

    info!(cards, courses = by_code.len(), "Parsed course plan");
    by_code
        .into_iter()
        .map(|(code, name)| Course { code, name })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: &str, name: &str) -> String {
        format!(
            r#"<div class="card"><div class="card-header"><h5>{}</h5></div><div class="card-body"><p>{}</p><small>3 credits</small></div></div>"#,
            code, name
        )
    }

    #[test]
    fn test_parse_courses_basic() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            card("20XT81", "Operating Systems"),
            card("20XT82", "Computer Networks")
        );
        let courses = parse_courses(&html);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].code, "20XT81");
        assert_eq!(courses[0].name, "Operating Systems");
        assert_eq!(courses[1].code, "20XT82");
    }

    #[test]
    fn test_duplicate_codes_last_wins() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            card("CS101", "Data Structures"),
            card("CS101", "DS")
        );
        let courses = parse_courses(&html);
        assert_eq!(
            courses,
            vec![Course {
                code: "CS101".to_string(),
                name: "DS".to_string()
            }]
        );
    }

    #[test]
    fn test_card_with_single_fragment_is_skipped() {
        let html = format!(
            r#"<html><body><div class="card"><h5>ORPHAN</h5></div>{}</body></html>"#,
            card("20XT83", "Compilers")
        );
        let courses = parse_courses(&html);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].code, "20XT83");
    }

    #[test]
    fn test_no_cards_is_empty() {
        assert!(parse_courses("<html><body><p>Nothing here</p></body></html>").is_empty());
    }
}
