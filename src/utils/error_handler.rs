use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value as JsonValue;

use crate::models::ErrorResponse;

#[derive(Debug)]
pub enum AppError {
    BadRequestErr(String),
    NotFound(String),
    Auth(String),
    ValidationErr(String, Option<JsonValue>),
    RateLimited(u64),
    AnyError(anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequestErr(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::ValidationErr(_, _) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::AnyError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self::AnyError(err.into())
    }
}

fn error_body(message: String, errors: Option<JsonValue>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        success: false,
        message,
        errors,
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::BadRequestErr(msg) => {
                tracing::debug!("Bad request: {}", msg);
                (status, error_body(msg, None)).into_response()
            }
            Self::NotFound(msg) => {
                tracing::debug!("Not Found: {}", msg);
                (status, error_body(msg, None)).into_response()
            }
            Self::Auth(msg) => {
                tracing::debug!("Unauthorized: {}", msg);
                (status, error_body(msg, None)).into_response()
            }
            Self::ValidationErr(msg, errors) => {
                tracing::debug!("Validation failed: {}", msg);
                (status, error_body(msg, errors)).into_response()
            }
            Self::RateLimited(retry_after) => {
                let msg = format!("Too many attempts. Please try again in {retry_after} seconds.");
                tracing::debug!("{msg}");
                let mut res = (status, error_body(msg, None)).into_response();
                if let Ok(val) = HeaderValue::from_str(&retry_after.to_string()) {
                    res.headers_mut().insert(header::RETRY_AFTER, val);
                }
                res
            }
            Self::AnyError(err) => {
                // the cause is logged only, never sent to the caller
                tracing::error!("Something went wrong: {err:?}");
                let msg = "Something went wrong. Please try again later.".to_owned();
                (status, error_body(msg, None)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(res: Response) -> ErrorResponse {
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let res = AppError::RateLimited(42).into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers()[header::RETRY_AFTER], "42");
        let body = body_of(res).await;
        assert_eq!(body.success, false);
        assert!(body.message.contains("42 seconds"));
    }

    #[tokio::test]
    async fn test_any_error_hides_cause() {
        let err: AppError = anyhow::anyhow!("smtp password rejected").into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(res).await;
        assert!(!body.message.contains("smtp"));
    }

    #[tokio::test]
    async fn test_validation_error_carries_field_errors() {
        let errors = serde_json::json!({"email": ["Invalid email"]});
        let err = AppError::ValidationErr("Invalid input".into(), Some(errors));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_of(res).await;
        assert_eq!(body.errors.unwrap()["email"][0], "Invalid email");
    }
}
