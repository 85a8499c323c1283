//! Course plan lookups

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use studzone_core::Course;

use crate::{same_text, SessionManager, ToolError, ToolResult};

/// Summary figures over the course plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStatistics {
    pub total_courses: usize,
    /// Course count per department, keyed by the first two code characters
    pub departments: BTreeMap<String, usize>,
    pub unique_departments: usize,
    /// Rounded to two decimals
    pub average_name_length: f64,
    /// Rounded to two decimals
    pub average_code_length: f64,
}

/// Department of a course: the first two characters of its code, uppercased.
pub fn department_code(course_code: &str) -> String {
    course_code.trim().chars().take(2).collect::<String>().to_uppercase()
}

/// Exact, case-insensitive lookup by course code.
pub fn find_course<'a>(courses: &'a [Course], code: &str) -> Option<&'a Course> {
    courses.iter().find(|c| same_text(&c.code, code))
}

/// Courses whose code or name contains `term`, case-insensitively.
pub fn search(courses: &[Course], term: &str) -> Vec<Course> {
    let term = term.trim().to_lowercase();
    courses
        .iter()
        .filter(|c| c.code.to_lowercase().contains(&term) || c.name.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Courses whose code starts with `prefix`, case-insensitively.
pub fn by_department(courses: &[Course], prefix: &str) -> Vec<Course> {
    let prefix = prefix.trim().to_uppercase();
    courses
        .iter()
        .filter(|c| c.code.to_uppercase().starts_with(&prefix))
        .cloned()
        .collect()
}

pub fn course_statistics(courses: &[Course]) -> CourseStatistics {
    let mut departments = BTreeMap::new();
    for course in courses {
        *departments.entry(department_code(&course.code)).or_insert(0) += 1;
    }

    let average = |total: usize| {
        if courses.is_empty() {
            0.0
        } else {
            round2(total as f64 / courses.len() as f64)
        }
    };

    CourseStatistics {
        total_courses: courses.len(),
        unique_departments: departments.len(),
        departments,
        average_name_length: average(courses.iter().map(|c| c.name.chars().count()).sum()),
        average_code_length: average(courses.iter().map(|c| c.code.chars().count()).sum()),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn non_blank(value: &str, what: &str) -> ToolResult<()> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(())
}

impl SessionManager {
    pub async fn all_courses(&self) -> ToolResult<Arc<Vec<Course>>> {
        let courses = self.fetch_courses(false).await?;
        info!(courses = courses.len(), "Listed courses");
        Ok(courses)
    }

    pub async fn search_courses(&self, term: &str) -> ToolResult<Vec<Course>> {
        non_blank(term, "search term")?;
        let courses = self.fetch_courses(false).await?;
        let found = search(&courses, term);
        info!(term, matches = found.len(), "Searched courses");
        Ok(found)
    }

    pub async fn course_details(&self, code: &str) -> ToolResult<Course> {
        non_blank(code, "course code")?;
        let courses = self.fetch_courses(false).await?;
        find_course(&courses, code)
            .cloned()
            .ok_or_else(|| ToolError::NotFound {
                query: code.to_string(),
                available: courses.iter().map(|c| c.code.clone()).collect(),
            })
    }

    pub async fn courses_by_department(&self, prefix: &str) -> ToolResult<Vec<Course>> {
        non_blank(prefix, "department code")?;
        let courses = self.fetch_courses(false).await?;
        let found = by_department(&courses, prefix);
        info!(department = prefix, matches = found.len(), "Filtered courses by department");
        Ok(found)
    }

    pub async fn course_statistics(&self) -> ToolResult<CourseStatistics> {
        let courses = self.fetch_courses(false).await?;
        Ok(course_statistics(&courses))
    }

    /// Refetch the course plan, bypassing the cache.
    pub async fn refresh_courses(&self) -> ToolResult<Arc<Vec<Course>>> {
        let courses = self.fetch_courses(true).await?;
        info!(courses = courses.len(), "Refreshed course plan");
        Ok(courses)
    }
}
