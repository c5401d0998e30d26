use axum::{http::StatusCode, Router};

use purok_incident_backend::models::AuthResponse;

use crate::helper::helper::{build_post_request, call};

/// Login through the http api and return the auth response
pub async fn login(app: &Router, path: &str, email: &str, password: &str) -> AuthResponse {
    let body = format!(r#"{{"email": "{email}", "password": "{password}"}}"#);
    let (status, res): (_, AuthResponse) = call(app, build_post_request(path, &body, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res.success, true);
    assert_eq!(res.data.token_type, "Bearer");
    res
}
