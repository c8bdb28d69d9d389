//! Member entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::member::{
    ConnectionDetails, EmploymentDetails, EmploymentStatus, Member, MemberRole, MemberStatus,
    PersonalDetails,
};
use sqlx::FromRow;

/// Database enum for member_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
pub enum MemberStatusDb {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl From<MemberStatusDb> for MemberStatus {
    fn from(db: MemberStatusDb) -> Self {
        match db {
            MemberStatusDb::Draft => MemberStatus::Draft,
            MemberStatusDb::Pending => MemberStatus::Pending,
            MemberStatusDb::Approved => MemberStatus::Approved,
            MemberStatusDb::Rejected => MemberStatus::Rejected,
        }
    }
}

impl From<MemberStatus> for MemberStatusDb {
    fn from(status: MemberStatus) -> Self {
        match status {
            MemberStatus::Draft => MemberStatusDb::Draft,
            MemberStatus::Pending => MemberStatusDb::Pending,
            MemberStatus::Approved => MemberStatusDb::Approved,
            MemberStatus::Rejected => MemberStatusDb::Rejected,
        }
    }
}

/// Database enum for member_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
pub enum MemberRoleDb {
    Member,
    Admin,
}

impl From<MemberRoleDb> for MemberRole {
    fn from(db: MemberRoleDb) -> Self {
        match db {
            MemberRoleDb::Member => MemberRole::Member,
            MemberRoleDb::Admin => MemberRole::Admin,
        }
    }
}

impl From<MemberRole> for MemberRoleDb {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Member => MemberRoleDb::Member,
            MemberRole::Admin => MemberRoleDb::Admin,
        }
    }
}

/// Database enum for employment_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "employment_status", rename_all = "lowercase")]
pub enum EmploymentStatusDb {
    Employed,
    Unemployed,
}

impl From<EmploymentStatusDb> for EmploymentStatus {
    fn from(db: EmploymentStatusDb) -> Self {
        match db {
            EmploymentStatusDb::Employed => EmploymentStatus::Employed,
            EmploymentStatusDb::Unemployed => EmploymentStatus::Unemployed,
        }
    }
}

impl From<EmploymentStatus> for EmploymentStatusDb {
    fn from(status: EmploymentStatus) -> Self {
        match status {
            EmploymentStatus::Employed => EmploymentStatusDb::Employed,
            EmploymentStatus::Unemployed => EmploymentStatusDb::Unemployed,
        }
    }
}

/// Row of `members` joined with the member's course codes.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub id: String,
    pub email: String,
    pub status: MemberStatusDb,
    pub role: MemberRoleDb,
    pub full_name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub enrollment_code: String,
    pub profile_image_url: Option<String>,
    pub employment_status: EmploymentStatusDb,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub profile_link: Option<String>,
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_edit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub courses: Vec<String>,
}

impl From<MemberEntity> for Member {
    fn from(e: MemberEntity) -> Self {
        Self {
            id: e.id,
            status: e.status.into(),
            role: e.role.into(),
            personal_details: PersonalDetails {
                full_name: e.full_name,
                age: e.age,
                gender: e.gender,
                enrollment_code: e.enrollment_code,
                profile_image_url: e.profile_image_url,
            },
            employment_details: EmploymentDetails {
                status: e.employment_status.into(),
                company: e.company,
                industry: e.industry,
                location: e.location,
            },
            connection_details: ConnectionDetails {
                email: e.email,
                contact_number: e.contact_number,
                profile_link: e.profile_link,
            },
            selected_courses: e.courses,
            submitted: e.submitted,
            submitted_at: e.submitted_at,
            last_edit_at: e.last_edit_at,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
