use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use domain::WorkflowError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Approved profile inside its edit-lock window.
    #[error("Conflict: {message}")]
    EditLocked {
        message: String,
        next_eligible_at: DateTime<Utc>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {message}")]
    ValidationDetails {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    /// Transient infrastructure failure. The client may retry.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
    #[serde(rename = "next_eligible_at", skip_serializing_if = "Option::is_none")]
    next_eligible_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let mut next_eligible_at = None;
        let mut retryable = None;

        let (status, error_code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::EditLocked {
                message,
                next_eligible_at: at,
            } => {
                next_eligible_at = Some(at);
                (StatusCode::CONFLICT, "edit_locked", message)
            }
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::ValidationDetails {
                message,
                details: d,
            } => {
                details = Some(d);
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg)
            }
            ApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                msg,
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                retryable = Some(true);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "Service temporarily unavailable. Please try again.".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
            next_eligible_at,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::MissingRequirement(req) => ApiError::ValidationDetails {
                details: vec![ValidationDetail {
                    field: req.field().to_string(),
                    message: message.clone(),
                }],
                message,
            },
            WorkflowError::Invalid(msg) => ApiError::Validation(msg),
            WorkflowError::Forbidden(msg) => ApiError::Forbidden(msg),
            WorkflowError::EditLocked { next_eligible_at } => ApiError::EditLocked {
                message,
                next_eligible_at,
            },
            WorkflowError::Conflict(msg) => ApiError::Conflict(msg),
            WorkflowError::NotFound(msg) => ApiError::NotFound(msg),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::ServiceUnavailable(format!("Database unavailable: {}", err))
            }
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        "23514" => ApiError::Validation("Value out of range".into()),
                        "40001" | "40P01" => ApiError::ServiceUnavailable(format!(
                            "Transaction could not be serialized: {}",
                            db_err
                        )),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = Vec::new();
        collect_validation_details(&errors, "", &mut details);

        let message = match details.len() {
            0 => "Invalid request".to_string(),
            1 => details[0].message.clone(),
            n => format!("{} validation errors", n),
        };

        ApiError::ValidationDetails { message, details }
    }
}

fn collect_validation_details(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut Vec<ValidationDetail>,
) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            validator::ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| ValidationDetail {
                    field: path.clone(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", path)),
                }));
            }
            validator::ValidationErrorsKind::Struct(inner) => {
                collect_validation_details(inner, &path, out);
            }
            validator::ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_validation_details(inner, &format!("{}[{}]", path, idx), out);
                }
            }
        }
    }
}

/// Request bodies are camelCase on the wire; `validator` reports Rust field
/// names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<shared::pagination::CursorError> for ApiError {
    fn from(err: shared::pagination::CursorError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<crate::services::identity::IdentityError> for ApiError {
    fn from(err: crate::services::identity::IdentityError) -> Self {
        use crate::services::identity::IdentityError;
        match err {
            IdentityError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<crate::services::images::ImageStoreError> for ApiError {
    fn from(err: crate::services::images::ImageStoreError) -> Self {
        use crate::services::images::ImageStoreError;
        match err {
            ImageStoreError::UnsupportedType(_) => ApiError::UnsupportedMediaType(err.to_string()),
            ImageStoreError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            ImageStoreError::Empty => ApiError::Validation(err.to_string()),
            ImageStoreError::Io(e) => ApiError::Internal(format!("Image storage failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::TimeZone;
    use domain::Requirement;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::Unauthorized("test".to_string())),
            "Unauthorized: test"
        );
        assert_eq!(
            format!("{}", ApiError::Conflict("test".to_string())),
            "Conflict: test"
        );
        assert_eq!(format!("{}", ApiError::RateLimited), "Rate limited");
    }

    #[tokio::test]
    async fn test_edit_locked_body_carries_next_eligible_at() {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let error: ApiError = WorkflowError::EditLocked { next_eligible_at: at }.into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "edit_locked");
        assert_eq!(body["next_eligible_at"], "2025-04-01T12:00:00Z");
        assert!(body["message"].as_str().unwrap().contains("2025-04-01"));
    }

    #[tokio::test]
    async fn test_service_unavailable_is_retryable_without_detail() {
        let error: ApiError = sqlx::Error::PoolTimedOut.into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["retryable"], true);
        assert!(!body["message"].as_str().unwrap().contains("pool"));
    }

    #[tokio::test]
    async fn test_missing_requirement_names_field() {
        let error: ApiError = WorkflowError::MissingRequirement(Requirement::Gender).into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "gender");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("personal details"));
    }

    #[test]
    fn test_workflow_error_mapping() {
        assert!(matches!(
            ApiError::from(WorkflowError::Forbidden("no".into())),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(WorkflowError::Conflict("no".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(WorkflowError::NotFound("no".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(WorkflowError::Invalid("no".into())),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        match error {
            ApiError::NotFound(msg) => assert_eq!(msg, "Resource not found"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_camel_case_field_names() {
        assert_eq!(camel_case("age"), "age");
        assert_eq!(camel_case("personal_details"), "personalDetails");
        assert_eq!(camel_case("target_member_id"), "targetMemberId");
        assert_eq!(camel_case("_private"), "private");
    }

    #[test]
    fn test_from_validation_errors_uses_wire_names() {
        use validator::Validate;

        let req: domain::models::UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "connectionDetails": { "contactNumber": "9".repeat(40) }
        }))
        .unwrap();
        let error: ApiError = req.validate().unwrap_err().into();
        match error {
            ApiError::ValidationDetails { details, .. } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "connectionDetails.contactNumber");
            }
            other => panic!("Expected ValidationDetails, got {:?}", other),
        }
    }

    #[test]
    fn test_from_validation_errors_collects_nested_fields() {
        use validator::Validate;

        let req: domain::models::UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "personalDetails": { "age": 7 }
        }))
        .unwrap();
        let error: ApiError = req.validate().unwrap_err().into();
        match error {
            ApiError::ValidationDetails { message, details } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "personalDetails.age");
                assert!(message.contains("between 16 and 100"));
            }
            other => panic!("Expected ValidationDetails, got {:?}", other),
        }
    }
}
