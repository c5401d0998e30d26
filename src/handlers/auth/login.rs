use axum::{extract::State, Json};

use super::helper::{auth_response, ensure_not_punished};
use crate::{
    models::{AuthResponse, ErrorResponse, LoginReq, Role},
    services::password::verify_password,
    state::AppState,
    store::UserStore,
    utils::{get_epoch_ts, normalize_email, AppError, ValidatedBody},
};

const STAFF_AND_CITIZEN: [Role; 3] = [Role::Citizen, Role::Operator, Role::Admin];
const PUROK_LEADER: [Role; 1] = [Role::PurokLeader];

/// Login
///
/// Email and password login for citizens, operators and admins
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Account inactive or suspended", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "Auth API"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<LoginReq>,
) -> Result<Json<AuthResponse>, AppError> {
    let res = login(&state, &body, &STAFF_AND_CITIZEN).await?;
    Ok(Json(res))
}

/// Purok leader login
///
/// Email and password login reserved for purok leaders
#[utoipa::path(
    post,
    path = "/login/purok-leader",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Account inactive or suspended", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "Auth API"
)]
pub async fn purok_leader_login_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<LoginReq>,
) -> Result<Json<AuthResponse>, AppError> {
    let res = login(&state, &body, &PUROK_LEADER).await?;
    Ok(Json(res))
}

async fn login(state: &AppState, body: &LoginReq, roles: &[Role]) -> Result<AuthResponse, AppError> {
    let invalid = || AppError::Auth("These credentials do not match our records.".into());
    let email = normalize_email(&body.email);
    let mut user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;
    // a wrong role is reported exactly like a wrong password
    let password_ok = verify_password(&body.password, &user.password_hash).await?;
    if !password_ok || !roles.contains(&user.role) {
        return Err(invalid());
    }
    if !user.is_active {
        let err = AppError::BadRequestErr("Your account is inactive.".into());
        return Err(err);
    }
    let now = get_epoch_ts();
    ensure_not_punished(state.store.as_ref(), user.id, now).await?;
    state.store.update_last_login(user.id, now).await?;
    user.last_login_time = Some(now);
    tracing::debug!("User {} logged in as {}", user.id, user.role);
    auth_response(&user, "Login successful.")
}
