use axum::{extract::State, Json};

use crate::{
    models::{ErrorResponse, GenericResponse, ResetPasswordReq},
    services::password::hash_password,
    state::AppState,
    store::{ResetTokenStore, UserStore},
    utils::{get_epoch_ts, normalize_email, AppError, ValidatedBody},
};

/// Reset password
///
/// Set a new password with the token handed out by a `forgot_password` otp verify.
/// The token is single use and every session of the user is logged out.
#[utoipa::path(
    post,
    path = "/password/reset",
    request_body = ResetPasswordReq,
    responses(
        (status = 200, description = "Password changed", body = GenericResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "Auth API"
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<ResetPasswordReq>,
) -> Result<Json<GenericResponse>, AppError> {
    let email = normalize_email(&body.email);
    let now = get_epoch_ts();
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AppError::NotFound(format!("No active account found with email: {email}")))?;
    let token = state.store.take_reset_token(&email, &body.token, now).await?;
    if token.is_none() {
        let msg = "This password reset token is invalid or has expired.";
        return Err(AppError::BadRequestErr(msg.into()));
    }
    let password_hash = hash_password(&body.password).await?;
    state.store.update_password(user.id, &password_hash, now).await?;
    state.store.bump_token_version(user.id).await?;
    state.store.delete_reset_tokens(&email).await?;
    tracing::info!("Password reset for user {}", user.id);
    let res = GenericResponse {
        success: true,
        message: "Your password has been reset.".to_owned(),
    };
    Ok(Json(res))
}
