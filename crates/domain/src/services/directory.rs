//! Directory visibility rules.

use crate::models::member::{DirectoryEntry, Member};

/// Who is looking at a directory entry.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub member_id: &'a str,
    pub is_admin: bool,
}

/// Contact fields are visible to the member themself, administrators, and
/// accepted connections.
pub fn can_view_contact(viewer: Viewer<'_>, subject_id: &str, connected: bool) -> bool {
    viewer.is_admin || viewer.member_id == subject_id || connected
}

/// Builds a directory entry, redacting contact fields when not visible.
pub fn to_directory_entry(member: Member, contact_visible: bool) -> DirectoryEntry {
    let Member {
        id,
        personal_details,
        employment_details,
        connection_details,
        selected_courses,
        ..
    } = member;

    DirectoryEntry {
        id,
        full_name: personal_details.full_name,
        enrollment_code: personal_details.enrollment_code,
        profile_image_url: personal_details.profile_image_url,
        email: connection_details.email,
        employment_status: employment_details.status,
        company: employment_details.company,
        industry: employment_details.industry,
        location: employment_details.location,
        contact_number: connection_details.contact_number.filter(|_| contact_visible),
        profile_link: connection_details.profile_link.filter(|_| contact_visible),
        courses: selected_courses,
        contact_visible,
    }
}
