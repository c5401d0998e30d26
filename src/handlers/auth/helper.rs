use crate::{
    jwt::JWT_KEYS,
    models::{AuthData, AuthResponse, User, UserProfile},
    services::suspension,
    store::Store,
    utils::{format_epoch_ts, AppError},
};

/// Fresh token pair for the user wrapped in the auth response
pub fn auth_response(user: &User, message: &str) -> Result<AuthResponse, AppError> {
    let pair = JWT_KEYS.generate_token_pair(user)?;
    let data = AuthData {
        user: UserProfile::from(user),
        token: pair.token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer".to_owned(),
        expires_in: pair.expires_in,
    };
    Ok(AuthResponse {
        success: true,
        message: message.to_owned(),
        data,
    })
}

/// Refuse users serving an active punishment
pub async fn ensure_not_punished(store: &dyn Store, user_id: u32, now: u64) -> Result<(), AppError> {
    let Some(active) = suspension::active_suspension(store, user_id, now).await? else {
        return Ok(());
    };
    let msg = match active.expires_at {
        Some(expires_at) => format!(
            "Your account is suspended until {}.",
            format_epoch_ts(expires_at)
        ),
        None => "Your account has been permanently suspended.".to_owned(),
    };
    Err(AppError::BadRequestErr(msg))
}
