//! CSV export of member profiles.

use crate::models::member::Member;

/// Column headers of the member export, in order.
pub const MEMBER_CSV_HEADERS: [&str; 13] = [
    "Enrollment No",
    "Name",
    "Email",
    "Gender",
    "Age",
    "Status",
    "Courses",
    "Company",
    "Location",
    "Contact Number",
    "Profile Link",
    "Profile Submitted",
    "Submission Date",
];

/// Renders members as CSV. Every field is quoted; embedded quotes are doubled.
pub fn members_to_csv(members: &[Member]) -> String {
    let mut out = String::new();
    push_row(&mut out, MEMBER_CSV_HEADERS.iter().map(|h| h.to_string()));

    for m in members {
        let p = &m.personal_details;
        let e = &m.employment_details;
        let c = &m.connection_details;
        push_row(
            &mut out,
            [
                p.enrollment_code.clone(),
                p.full_name.clone(),
                c.email.clone(),
                p.gender.clone().unwrap_or_default(),
                p.age.map(|a| a.to_string()).unwrap_or_default(),
                m.status.to_string(),
                m.selected_courses.join("; "),
                e.company.clone().unwrap_or_default(),
                e.location.clone().unwrap_or_default(),
                c.contact_number.clone().unwrap_or_default(),
                c.profile_link.clone().unwrap_or_default(),
                if m.submitted { "Yes" } else { "No" }.to_string(),
                m.submitted_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ],
        );
    }

    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| quote(&f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
