//! Profile lifecycle rules.
//!
//! A profile moves `draft -> pending -> approved | rejected`, and a rejected
//! profile may be resubmitted. These functions only decide whether a
//! transition or edit is allowed; persistence applies the result.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{Requirement, WorkflowError};
use crate::models::admin::ReviewDecision;
use crate::models::member::{EmploymentStatus, Member, MemberStatus, UpdateProfileRequest};
use shared::validation::{is_recognized_profile_link, normalize_optional};

/// Days an approved profile stays locked after an edit.
pub const EDIT_LOCK_DAYS: i64 = 15;

/// Prefix of generated enrollment codes.
pub const DEFAULT_ENROLLMENT_PREFIX: &str = "CF";

/// Formats the enrollment code for the `seq`-th member, e.g. `CF0001`.
pub fn enrollment_code(prefix: &str, seq: i64) -> String {
    format!("{}{:04}", prefix, seq)
}

/// Returns true if the state machine has an edge `from -> to`.
pub fn can_transition(from: MemberStatus, to: MemberStatus) -> bool {
    use MemberStatus::*;
    matches!(
        (from, to),
        (Draft, Pending)
            | (Rejected, Pending)
            | (Pending, Approved)
            | (Pending, Rejected)
            | (Approved, Approved)
    )
}

/// Edit-lock settings.
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    pub edit_lock_days: i64,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            edit_lock_days: EDIT_LOCK_DAYS,
        }
    }
}

impl LifecyclePolicy {
    pub fn new(edit_lock_days: i64) -> Self {
        Self { edit_lock_days }
    }

    pub fn next_edit_eligible_at(&self, last_edit_at: DateTime<Utc>) -> DateTime<Utc> {
        last_edit_at + Duration::days(self.edit_lock_days)
    }

    /// Decides whether the owner may edit the profile at `now`.
    pub fn check_edit_allowed(&self, member: &Member, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        match member.status {
            MemberStatus::Draft | MemberStatus::Rejected => Ok(()),
            MemberStatus::Pending => Err(WorkflowError::Conflict(
                "Profile is locked while it is under review".to_string(),
            )),
            MemberStatus::Approved => match member.last_edit_at {
                Some(last) => {
                    let next = self.next_edit_eligible_at(last);
                    if now >= next {
                        Ok(())
                    } else {
                        Err(WorkflowError::EditLocked {
                            next_eligible_at: next,
                        })
                    }
                }
                None => Ok(()),
            },
        }
    }
}

/// Checks that a profile may be submitted for review.
///
/// Requirements are checked in form order so the first unmet one is named.
pub fn check_submission(member: &Member) -> Result<(), WorkflowError> {
    match member.status {
        MemberStatus::Draft | MemberStatus::Rejected => {}
        MemberStatus::Pending => {
            return Err(WorkflowError::Conflict(
                "Profile is already pending review".to_string(),
            ))
        }
        MemberStatus::Approved => {
            return Err(WorkflowError::Conflict(
                "Profile is already approved".to_string(),
            ))
        }
    }

    let personal = &member.personal_details;
    let contact = &member.connection_details;
    let employment = &member.employment_details;

    if is_blank(Some(&personal.full_name)) {
        return missing(Requirement::FullName);
    }
    if personal.age.is_none() {
        return missing(Requirement::Age);
    }
    if is_blank(personal.gender.as_ref()) {
        return missing(Requirement::Gender);
    }
    if is_blank(contact.contact_number.as_ref()) {
        return missing(Requirement::ContactNumber);
    }
    match contact.profile_link.as_deref() {
        Some(link) if is_recognized_profile_link(link) => {}
        _ => return missing(Requirement::ProfileLink),
    }
    if employment.status == EmploymentStatus::Employed {
        if is_blank(employment.industry.as_ref()) {
            return missing(Requirement::Industry);
        }
        if is_blank(employment.company.as_ref()) {
            return missing(Requirement::Company);
        }
    }
    if member.selected_courses.is_empty() {
        return missing(Requirement::Courses);
    }

    Ok(())
}

/// Checks an administrator decision against the member's current status.
/// Returns the status to write.
pub fn check_review(member: &Member, decision: ReviewDecision) -> Result<MemberStatus, WorkflowError> {
    let target = decision.target_status();
    match member.status {
        MemberStatus::Pending => Ok(target),
        current if current == target => Err(WorkflowError::Conflict(format!(
            "Member is already {}",
            current
        ))),
        current => Err(WorkflowError::Conflict(format!(
            "Member is not pending review (status: {})",
            current
        ))),
    }
}

/// Course selection can only change before submission or after a rejection.
pub fn check_course_change(member: &Member) -> Result<(), WorkflowError> {
    match member.status {
        MemberStatus::Draft | MemberStatus::Rejected => Ok(()),
        MemberStatus::Pending => Err(WorkflowError::Conflict(
            "Courses cannot be modified while the profile is under review".to_string(),
        )),
        MemberStatus::Approved => Err(WorkflowError::Conflict(
            "Cannot modify courses after approval".to_string(),
        )),
    }
}

/// Applies a partial update to a copy of the profile and stamps `last_edit_at`.
///
/// Empty strings clear optional fields. Switching to unemployed clears
/// company and industry.
pub fn apply_update(member: &Member, update: UpdateProfileRequest, now: DateTime<Utc>) -> Member {
    let mut next = member.clone();

    if let Some(p) = update.personal_details {
        if let Some(name) = p.full_name {
            next.personal_details.full_name = name.trim().to_string();
        }
        if let Some(age) = p.age {
            next.personal_details.age = Some(age);
        }
        if p.gender.is_some() {
            next.personal_details.gender = normalize_optional(p.gender);
        }
    }

    if let Some(e) = update.employment_details {
        if let Some(status) = e.status {
            next.employment_details.status = status;
        }
        if e.company.is_some() {
            next.employment_details.company = normalize_optional(e.company);
        }
        if e.industry.is_some() {
            next.employment_details.industry = normalize_optional(e.industry);
        }
        if e.location.is_some() {
            next.employment_details.location = normalize_optional(e.location);
        }
        if next.employment_details.status == EmploymentStatus::Unemployed {
            next.employment_details.company = None;
            next.employment_details.industry = None;
        }
    }

    if let Some(c) = update.connection_details {
        if c.contact_number.is_some() {
            next.connection_details.contact_number = normalize_optional(c.contact_number);
        }
        if c.profile_link.is_some() {
            next.connection_details.profile_link = normalize_optional(c.profile_link);
        }
    }

    next.last_edit_at = Some(now);
    next.updated_at = now;
    next
}

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn missing(requirement: Requirement) -> Result<(), WorkflowError> {
    Err(WorkflowError::MissingRequirement(requirement))
}
