//! Workflow error types.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// A single submission requirement that a profile can fail to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    FullName,
    Age,
    Gender,
    ContactNumber,
    ProfileLink,
    Industry,
    Company,
    Courses,
}

impl Requirement {
    /// Field category shown to the member next to the unmet requirement.
    pub fn category(&self) -> &'static str {
        match self {
            Requirement::FullName | Requirement::Age | Requirement::Gender => "personal details",
            Requirement::ContactNumber | Requirement::ProfileLink => "connection details",
            Requirement::Industry | Requirement::Company => "employment details",
            Requirement::Courses => "courses",
        }
    }

    /// Field name as it appears in request and response bodies.
    pub fn field(&self) -> &'static str {
        match self {
            Requirement::FullName => "fullName",
            Requirement::Age => "age",
            Requirement::Gender => "gender",
            Requirement::ContactNumber => "contactNumber",
            Requirement::ProfileLink => "profileLink",
            Requirement::Industry => "industry",
            Requirement::Company => "company",
            Requirement::Courses => "courses",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Requirement::FullName => "full name is required",
            Requirement::Age => "age is required",
            Requirement::Gender => "gender is required",
            Requirement::ContactNumber => "contact number is required",
            Requirement::ProfileLink => "a LinkedIn profile link is required",
            Requirement::Industry => "industry is required when employed",
            Requirement::Company => "company is required when employed",
            Requirement::Courses => "select at least one course",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Incomplete {}: {}", self.category(), self.describe())
    }
}

/// Errors raised by workflow rules before anything is written.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("{0}")]
    MissingRequirement(Requirement),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Profile was edited recently; retry after {}", next_eligible_at.format("%Y-%m-%d"))]
    EditLocked { next_eligible_at: DateTime<Utc> },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_requirement_message_names_category() {
        let msg = WorkflowError::MissingRequirement(Requirement::ContactNumber).to_string();
        assert!(msg.contains("connection details"));
        assert!(msg.contains("contact number"));

        let msg = WorkflowError::MissingRequirement(Requirement::Courses).to_string();
        assert!(msg.contains("courses"));
    }

    #[test]
    fn test_requirement_categories() {
        assert_eq!(Requirement::Age.category(), "personal details");
        assert_eq!(Requirement::ProfileLink.category(), "connection details");
        assert_eq!(Requirement::Company.category(), "employment details");
    }

    #[test]
    fn test_edit_locked_message_has_date() {
        let at = Utc.with_ymd_and_hms(2025, 3, 16, 9, 0, 0).unwrap();
        let msg = WorkflowError::EditLocked { next_eligible_at: at }.to_string();
        assert!(msg.contains("2025-03-16"));
    }
}
