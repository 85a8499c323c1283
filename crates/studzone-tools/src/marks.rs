//! Continuous-assessment marks lookups
//!
//! Subjects are matched by code or name. An exact (case-insensitive) match
//! wins; otherwise the first substring match is taken. Lab subjects are
//! searched before theory subjects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use studzone_core::{CaMarks, SubjectMarks};

use crate::{same_text, SessionManager, ToolError, ToolResult};

/// Which CA test. Lab subjects report CA1/CA2, theory subjects T1/T2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaExam {
    First,
    Second,
}

impl CaExam {
    pub fn label(self) -> &'static str {
        match self {
            CaExam::First => "CA1",
            CaExam::Second => "CA2",
        }
    }

    fn of(self, marks: &SubjectMarks) -> Option<f64> {
        match (self, marks) {
            (CaExam::First, SubjectMarks::Lab(m)) => m.ca1,
            (CaExam::Second, SubjectMarks::Lab(m)) => m.ca2,
            (CaExam::First, SubjectMarks::Theory(m)) => m.t1,
            (CaExam::Second, SubjectMarks::Theory(m)) => m.t2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Lab,
    Theory,
}

impl SubjectKind {
    fn of(marks: &SubjectMarks) -> Self {
        match marks {
            SubjectMarks::Lab(_) => SubjectKind::Lab,
            SubjectMarks::Theory(_) => SubjectKind::Theory,
        }
    }
}

/// A subject listed on the marks page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub subject_code: String,
    pub subject_name: String,
    pub kind: SubjectKind,
}

/// A single mark of a single subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMark {
    pub subject_code: String,
    pub subject_name: String,
    pub kind: SubjectKind,
    /// `None` when the portal shows no number
    pub mark: Option<f64>,
}

impl SubjectMark {
    fn new(marks: &SubjectMarks, mark: Option<f64>) -> Self {
        Self {
            subject_code: marks.subject_code().to_string(),
            subject_name: marks.subject_name().to_string(),
            kind: SubjectKind::of(marks),
            mark,
        }
    }
}

/// Every subject, lab first.
pub fn all_subjects(marks: &CaMarks) -> Vec<SubjectMarks> {
    marks
        .lab
        .iter()
        .cloned()
        .map(SubjectMarks::Lab)
        .chain(marks.theory.iter().cloned().map(SubjectMarks::Theory))
        .collect()
}

/// Find a subject by code or name.
pub fn find_subject(marks: &CaMarks, query: &str) -> Option<SubjectMarks> {
    let subjects = all_subjects(marks);
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let exact = subjects
        .iter()
        .position(|s| same_text(s.subject_code(), query) || same_text(s.subject_name(), query));
    let index = exact.or_else(|| {
        subjects.iter().position(|s| {
            s.subject_code().to_lowercase().contains(&needle)
                || s.subject_name().to_lowercase().contains(&needle)
        })
    })?;

    subjects.into_iter().nth(index)
}

pub fn list_subjects(marks: &CaMarks) -> Vec<SubjectSummary> {
    all_subjects(marks)
        .iter()
        .map(|s| SubjectSummary {
            subject_code: s.subject_code().to_string(),
            subject_name: s.subject_name().to_string(),
            kind: SubjectKind::of(s),
        })
        .collect()
}

fn not_found(query: &str, marks: &CaMarks) -> ToolError {
    ToolError::NotFound {
        query: query.to_string(),
        available: list_subjects(marks)
            .into_iter()
            .map(|s| format!("{} ({})", s.subject_code, s.subject_name))
            .collect(),
    }
}

impl SessionManager {
    pub async fn all_marks(&self) -> ToolResult<Arc<CaMarks>> {
        let marks = self.fetch_marks().await?;
        info!(lab = marks.lab.len(), theory = marks.theory.len(), "Listed CA marks");
        Ok(marks)
    }

    /// All marks of the subject matching `query`.
    pub async fn subject_marks(&self, query: &str) -> ToolResult<SubjectMarks> {
        let marks = self.fetch_marks().await?;
        find_subject(&marks, query).ok_or_else(|| not_found(query, &marks))
    }

    /// CA1/T1 or CA2/T2 of the subject matching `query`.
    pub async fn ca_mark(&self, query: &str, exam: CaExam) -> ToolResult<SubjectMark> {
        let marks = self.fetch_marks().await?;
        let subject = find_subject(&marks, query).ok_or_else(|| not_found(query, &marks))?;
        debug!(subject = subject.subject_code(), exam = exam.label(), "Found subject");
        Ok(SubjectMark::new(&subject, exam.of(&subject)))
    }

    /// The given CA test of every subject that has a mark for it.
    pub async fn all_ca_marks(&self, exam: CaExam) -> ToolResult<Vec<SubjectMark>> {
        let marks = self.fetch_marks().await?;
        Ok(all_subjects(&marks)
            .iter()
            .filter_map(|s| exam.of(s).map(|mark| SubjectMark::new(s, Some(mark))))
            .collect())
    }

    /// Assignment marks of every theory subject.
    pub async fn assignment_marks(&self) -> ToolResult<Vec<SubjectMark>> {
        let marks = self.fetch_marks().await?;
        Ok(marks
            .theory
            .iter()
            .map(|t| SubjectMark::new(&SubjectMarks::Theory(t.clone()), t.assignment))
            .collect())
    }

    /// Tutorial marks of every theory subject.
    pub async fn tutorial_marks(&self) -> ToolResult<Vec<SubjectMark>> {
        let marks = self.fetch_marks().await?;
        Ok(marks
            .theory
            .iter()
            .map(|t| SubjectMark::new(&SubjectMarks::Theory(t.clone()), t.tutorial))
            .collect())
    }

    pub async fn list_subjects(&self) -> ToolResult<Vec<SubjectSummary>> {
        let marks = self.fetch_marks().await?;
        Ok(list_subjects(&marks))
    }
}
