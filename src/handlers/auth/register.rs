use axum::{extract::State, http::StatusCode, Json};

use super::helper::auth_response;
use crate::{
    constants::*,
    models::{AuthResponse, ErrorResponse, OtpPurpose, RegisterReq, Role, User},
    services::password::hash_password,
    state::AppState,
    store::{OtpStore, UserStore},
    utils::{get_epoch_ts, normalize_email, AppError, ValidatedBody},
};

/// Register
///
/// Create a citizen account. The email must have passed a `registration` otp within the last 30 minutes.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Email taken or not verified", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "Auth API"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<RegisterReq>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&body.email);
    let taken = || AppError::BadRequestErr("The email has already been taken.".into());
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(taken());
    }
    let now = get_epoch_ts();
    let since = now.saturating_sub(REGISTRATION_VERIFY_WINDOW_SECS);
    let verified = state
        .store
        .find_consumed_otp(&email, OtpPurpose::Registration, since)
        .await?;
    if verified.is_none() {
        let msg = "Please verify your email with an OTP before registering.";
        return Err(AppError::BadRequestErr(msg.into()));
    }
    let user = User {
        id: state.store.next_user_id().await?,
        name: body.name.trim().to_owned(),
        email,
        password_hash: hash_password(&body.password).await?,
        role: Role::Citizen,
        is_active: true,
        email_verified: true,
        token_version: 0,
        last_login_time: Some(now),
        created_ts: Some(now),
        updated_ts: None,
    };
    if !state.store.insert_user(&user).await? {
        return Err(taken());
    }
    tracing::info!("Registered citizen {} with id {}", user.email, user.id);
    let res = auth_response(&user, "Registration successful.")?;
    Ok((StatusCode::CREATED, Json(res)))
}
