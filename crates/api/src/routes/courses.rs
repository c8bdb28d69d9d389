//! Course catalogue and course registration routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::course::{
    is_valid_course_code, normalize_course_code, Course, CourseWithEnrollment, CreateCourseRequest,
};
use domain::services::lifecycle::check_course_change;
use domain::services::notification::{deliver, MailMessage};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::middleware::metrics::record_email_result;
use crate::middleware::CurrentMember;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub course_code: String,
    pub registered: bool,
    pub selected_courses: Vec<String>,
}

/// List courses with enrollment counts.
///
/// GET /api/v1/courses
///
/// Enrolled emails are only included for administrators.
pub async fn list_courses(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Result<Json<Vec<CourseWithEnrollment>>, ApiError> {
    let include_emails = member.is_admin();
    let courses = state
        .courses
        .list_with_enrollment()
        .await?
        .into_iter()
        .map(|c| c.into_view(&member.id, include_emails))
        .collect();
    Ok(Json(courses))
}

/// Register for a course.
///
/// POST /api/v1/courses/:code/registration
///
/// Allowed while the profile is in draft or rejected status. Registering
/// twice is a no-op; a confirmation email goes out on the first registration.
pub async fn register(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    Path(code): Path<String>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    check_course_change(&member)?;

    let code = normalize_course_code(&code);
    let course = state
        .courses
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", code)))?;

    let newly_registered = state.courses.register(&course.code, &member.id).await?;
    let mut selected = member.selected_courses.clone();

    if newly_registered {
        info!(member_id = %member.id, course = %course.code, "Course registration added");

        let opted_in = state.settings.email_opt_in(&member.id).await?;
        let message = MailMessage::course_registration(
            member.email(),
            &member.personal_details.full_name,
            &course.name,
        );
        let result = deliver(state.mailer.as_ref(), message, opted_in).await;
        record_email_result(&result);
    } else if !selected.contains(&course.code) {
        // Not written and not already present: the status moved on.
        return Err(ApiError::Conflict(
            "Courses can no longer be changed for this profile".to_string(),
        ));
    }

    if !selected.contains(&course.code) {
        selected.push(course.code.clone());
        selected.sort();
    }

    Ok(Json(RegistrationResponse {
        course_code: course.code,
        registered: true,
        selected_courses: selected,
    }))
}

/// Drop a course registration.
///
/// DELETE /api/v1/courses/:code/registration
pub async fn unregister(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    Path(code): Path<String>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    check_course_change(&member)?;

    let code = normalize_course_code(&code);
    if !state.courses.unregister(&code, &member.id).await? {
        return Err(ApiError::NotFound(format!(
            "Not registered for course {}",
            code
        )));
    }

    info!(member_id = %member.id, course = %code, "Course registration removed");

    let selected = member
        .selected_courses
        .into_iter()
        .filter(|c| *c != code)
        .collect();
    Ok(Json(RegistrationResponse {
        course_code: code,
        registered: false,
        selected_courses: selected,
    }))
}

/// Create a course.
///
/// POST /api/v1/admin/courses
pub async fn create_course(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let code = normalize_course_code(&request.code);
    if !is_valid_course_code(&code) {
        return Err(ApiError::Validation(
            "Course code may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Course name is required".to_string()));
    }

    let course = state.courses.create(&code, name).await.map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict(format!("Course {} already exists", code)),
        other => other,
    })?;

    info!(course = %course.code, "Course created");

    Ok((StatusCode::CREATED, Json(course.into())))
}

/// Delete a course and its registrations.
///
/// DELETE /api/v1/admin/courses/:code
pub async fn delete_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let code = normalize_course_code(&code);
    if !state.courses.delete(&code).await? {
        return Err(ApiError::NotFound(format!("Course {} not found", code)));
    }

    info!(course = %code, "Course deleted");

    Ok(StatusCode::NO_CONTENT)
}
