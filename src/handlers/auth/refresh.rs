use axum::{extract::State, Json};

use super::helper::auth_response;
use crate::{
    jwt::{TokenKind, JWT_KEYS},
    models::{AuthResponse, ErrorResponse, RefreshTokenReq},
    state::AppState,
    store::UserStore,
    utils::{AppError, ValidatedBody},
};

/// Renew token
///
/// Exchange a valid refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/token/refresh",
    request_body = RefreshTokenReq,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "Auth API"
)]
pub async fn refresh_token_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<RefreshTokenReq>,
) -> Result<Json<AuthResponse>, AppError> {
    let claims = JWT_KEYS.extract_claims(&body.refresh_token, TokenKind::Refresh)?;
    let invalid = || AppError::Auth("Invalid Token".into());
    let user = state
        .store
        .find_user_by_id(claims.id)
        .await?
        .ok_or_else(invalid)?;
    if !user.is_active || user.token_version != claims.ver {
        return Err(invalid());
    }
    let res = auth_response(&user, "Token renewed.")?;
    Ok(Json(res))
}
