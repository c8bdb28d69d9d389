//! Member profile domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::errors::WorkflowError;

/// Review status of a member profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Draft => "draft",
            MemberStatus::Pending => "pending",
            MemberStatus::Approved => "approved",
            MemberStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(MemberStatus::Draft),
            "pending" => Ok(MemberStatus::Pending),
            "approved" => Ok(MemberStatus::Approved),
            "rejected" => Ok(MemberStatus::Rejected),
            _ => Err(format!("Invalid member status: {}", s)),
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a member. Always read from storage, never from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "member",
            MemberRole::Admin => "admin",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    #[default]
    Unemployed,
    Employed,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "employed",
            EmploymentStatus::Unemployed => "unemployed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub full_name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub enrollment_code: String,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentDetails {
    pub status: EmploymentStatus,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub email: String,
    pub contact_number: Option<String>,
    pub profile_link: Option<String>,
}

/// A member profile, keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub status: MemberStatus,
    pub role: MemberRole,
    pub personal_details: PersonalDetails,
    pub employment_details: EmploymentDetails,
    pub connection_details: ConnectionDetails,
    pub selected_courses: Vec<String>,
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_edit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }

    pub fn is_approved(&self) -> bool {
        self.status == MemberStatus::Approved
    }

    pub fn email(&self) -> &str {
        &self.connection_details.email
    }

    pub fn display_name(&self) -> &str {
        if self.personal_details.full_name.trim().is_empty() {
            &self.connection_details.email
        } else {
            &self.personal_details.full_name
        }
    }
}

/// Profile fields written when an identity is first bound to a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub profile_image_url: Option<String>,
    pub role: MemberRole,
}

/// Partial update of personal details. `enrollmentCode` and the image URL are
/// managed by the server and ignored here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetailsUpdate {
    #[validate(length(max = 120, message = "Full name must be at most 120 characters"))]
    pub full_name: Option<String>,
    #[validate(range(min = 16, max = 100, message = "Age must be between 16 and 100"))]
    pub age: Option<i32>,
    #[validate(length(max = 32, message = "Gender must be at most 32 characters"))]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentDetailsUpdate {
    pub status: Option<EmploymentStatus>,
    #[validate(length(max = 120, message = "Company must be at most 120 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 80, message = "Industry must be at most 80 characters"))]
    pub industry: Option<String>,
    #[validate(length(max = 120, message = "Location must be at most 120 characters"))]
    pub location: Option<String>,
}

/// Partial update of contact details. The email address is not accepted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConnectionDetailsUpdate {
    #[validate(length(max = 32, message = "Contact number must be at most 32 characters"))]
    pub contact_number: Option<String>,
    #[validate(length(max = 300, message = "Profile link must be at most 300 characters"))]
    pub profile_link: Option<String>,
}

/// Request body for `PUT /api/v1/members/me`.
///
/// Absent sections and fields are left unchanged; an empty string clears an
/// optional field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(nested)]
    pub personal_details: Option<PersonalDetailsUpdate>,
    #[validate(nested)]
    pub employment_details: Option<EmploymentDetailsUpdate>,
    #[validate(nested)]
    pub connection_details: Option<ConnectionDetailsUpdate>,
}

impl UpdateProfileRequest {
    /// Format checks for contact fields that derive attributes cannot express.
    pub fn check(&self) -> Result<(), WorkflowError> {
        let Some(contact) = &self.connection_details else {
            return Ok(());
        };

        if let Some(phone) = contact.contact_number.as_deref().filter(|p| !p.trim().is_empty()) {
            shared::validation::validate_phone_number(phone).map_err(to_invalid)?;
        }
        if let Some(link) = contact.profile_link.as_deref().filter(|l| !l.trim().is_empty()) {
            shared::validation::validate_profile_link(link).map_err(to_invalid)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.personal_details.is_none()
            && self.employment_details.is_none()
            && self.connection_details.is_none()
    }
}

fn to_invalid(err: validator::ValidationError) -> WorkflowError {
    WorkflowError::Invalid(
        err.message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string()),
    )
}

/// Directory listing entry. Contact fields are `None` unless the viewer may see them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: String,
    pub full_name: String,
    pub enrollment_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    pub email: String,
    pub employment_status: EmploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_link: Option<String>,
    pub courses: Vec<String>,
    pub contact_visible: bool,
}

/// Query parameters for the directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}
