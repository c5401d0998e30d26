use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower::ServiceExt; // for `oneshot` and `ready`

use purok_incident_backend::{
    app::build_app,
    mailer::LogMailer,
    models::{OtpPurpose, Role, User},
    services::password::hash_password,
    state::AppState,
    store::{memory::MemoryStore, OtpStore, UserStore},
    utils::get_epoch_ts,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct GenericResponse {
    pub success: bool,
    pub message: String,
}

/// The whole router backed by a fresh in-memory store
pub fn get_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Arc::new(LogMailer));
    (build_app(state), store)
}

pub fn build_post_request(path: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .uri(path)
        .method("POST")
        .header("Content-Type", "application/json");
    let builder = if let Some(token) = token {
        builder.header("Authorization", format!("Bearer {token}"))
    } else {
        builder
    };
    builder.body(Body::from(body.to_owned())).unwrap()
}

pub fn build_get_request(path: &str, token: Option<&str>) -> Request<Body> {
    let builder = Request::builder().uri(path);
    let builder = if let Some(token) = token {
        builder.header("Authorization", format!("Bearer {token}"))
    } else {
        builder
    };
    builder.body(Body::empty()).unwrap()
}

pub async fn read_body<T: DeserializeOwned>(res: Response<axum::body::BoxBody>) -> T {
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Send the request and return the status with the parsed json body
pub async fn call<T: DeserializeOwned>(app: &Router, req: Request<Body>) -> (StatusCode, T) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    (status, read_body(res).await)
}

/// The live code the mailer would have delivered
pub async fn live_code(store: &MemoryStore, email: &str, purpose: OtpPurpose) -> String {
    store
        .find_live_otp(email, purpose, get_epoch_ts())
        .await
        .unwrap()
        .expect("an otp should have been sent")
        .otp
}

pub async fn insert_user(store: &MemoryStore, email: &str, password: &str, role: Role) -> User {
    let user = User {
        id: store.next_user_id().await.unwrap(),
        name: format!("{role} user"),
        email: email.to_owned(),
        password_hash: hash_password(password).await.unwrap(),
        role,
        is_active: true,
        email_verified: true,
        created_ts: Some(get_epoch_ts()),
        ..Default::default()
    };
    assert!(store.insert_user(&user).await.unwrap());
    user
}
