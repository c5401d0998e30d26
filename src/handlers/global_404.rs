use axum::http::Uri;
use axum::{http::StatusCode, Json};

use crate::models::ErrorResponse;

pub async fn global_404_handler(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    let msg = format!("Route `{}` does not exist", uri);
    tracing::debug!(msg);
    let res = ErrorResponse {
        success: false,
        message: msg,
        errors: None,
    };
    (StatusCode::NOT_FOUND, Json(res))
}
