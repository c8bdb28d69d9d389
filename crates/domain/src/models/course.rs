//! Course catalogue models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static::lazy_static! {
    static ref COURSE_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9][A-Z0-9_\-]{0,19}$").unwrap();
}

/// A course offered by the program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Course with its enrollment. Emails are only filled for administrators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithEnrollment {
    pub code: String,
    pub name: String,
    pub enrolled_count: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enrolled_emails: Vec<String>,
    /// Whether the caller is enrolled.
    pub registered: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 20, message = "Course code must be 1-20 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Course name must be 1-200 characters"))]
    pub name: String,
}

/// Canonical form of a course code: trimmed and upper-cased.
pub fn normalize_course_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Returns true if a normalized code only uses letters, digits, `-` and `_`.
pub fn is_valid_course_code(code: &str) -> bool {
    COURSE_CODE_REGEX.is_match(code)
}
