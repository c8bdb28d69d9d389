//! JSON body extractor that runs `validator` rules and reports failures as
//! `400` with the standard error body.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::UnsupportedMediaType("Expected application/json".to_string())
        }
        other => ApiError::Validation(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use domain::models::course::CreateCourseRequest;

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = json_request(r#"{"code":"DS101","name":"Data Science"}"#);
        let ValidJson(body) = ValidJson::<CreateCourseRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(body.code, "DS101");
    }

    #[tokio::test]
    async fn test_rule_violation_is_validation_error() {
        let req = json_request(r#"{"code":"","name":"Data Science"}"#);
        let result = ValidJson::<CreateCourseRequest>::from_request(req, &()).await;
        assert!(matches!(result, Err(ApiError::ValidationDetails { .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let req = json_request("{not json");
        let result = ValidJson::<CreateCourseRequest>::from_request(req, &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
