//! Course and industry entities.

use chrono::{DateTime, Utc};
use domain::models::course::{Course, CourseWithEnrollment};
use domain::models::industry::Industry;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct CourseEntity {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CourseEntity> for Course {
    fn from(e: CourseEntity) -> Self {
        Self {
            code: e.code,
            name: e.name,
            created_at: e.created_at,
        }
    }
}

/// Course row aggregated with its enrollment list.
#[derive(Debug, Clone, FromRow)]
pub struct CourseEnrollmentEntity {
    pub code: String,
    pub name: String,
    pub enrolled_count: i64,
    pub enrolled_emails: Vec<String>,
    pub enrolled_member_ids: Vec<String>,
}

impl CourseEnrollmentEntity {
    /// Converts for `viewer_id`; enrollment emails are only kept for administrators.
    pub fn into_view(self, viewer_id: &str, include_emails: bool) -> CourseWithEnrollment {
        let registered = self.enrolled_member_ids.iter().any(|id| id == viewer_id);
        CourseWithEnrollment {
            code: self.code,
            name: self.name,
            enrolled_count: self.enrolled_count,
            enrolled_emails: if include_emails {
                self.enrolled_emails
            } else {
                Vec::new()
            },
            registered,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct IndustryEntity {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<IndustryEntity> for Industry {
    fn from(e: IndustryEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            created_at: e.created_at,
        }
    }
}
