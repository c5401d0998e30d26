use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::helper::find_target;
use crate::{
    jwt::Moderator,
    models::{ErrorResponse, PunishmentResponse, SuspendUserReq},
    services::suspension,
    state::AppState,
    utils::{get_epoch_ts, AppError, ValidatedBody},
};

/// Suspend user
///
/// Give the user the next punishment tier. Warnings expire after 3 and 7 days, a suspension is permanent.
/// The user is logged out of every session.
#[utoipa::path(
    post,
    path = "/user/{id}/suspend",
    params(
        ("id" = u32, Path, description = "Id of the user"),
        ("authorization" = String, Header, description = "JWT token"),
    ),
    security(("authorization" = [])),
    request_body = SuspendUserReq,
    responses(
        (status = 201, description = "Punishment applied", body = PunishmentResponse),
        (status = 400, description = "Already punished, tier not available or target is a moderator", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found or no permission", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "Punishment API"
)]
pub async fn suspend_user_handler(
    Moderator(actor): Moderator,
    State(state): State<AppState>,
    Path(user_id): Path<u32>,
    ValidatedBody(body): ValidatedBody<SuspendUserReq>,
) -> Result<(StatusCode, Json<PunishmentResponse>), AppError> {
    if actor.id == user_id {
        let err = AppError::BadRequestErr("You cannot punish yourself.".into());
        return Err(err);
    }
    let target = find_target(state.store.as_ref(), user_id).await?;
    if target.role.can_moderate() {
        let msg = "Operators and administrators cannot be punished.";
        return Err(AppError::BadRequestErr(msg.into()));
    }
    let reason = body
        .reason
        .map(|reason| reason.trim().to_owned())
        .filter(|reason| !reason.is_empty());
    let record = suspension::apply(
        state.store.as_ref(),
        user_id,
        body.punishment_type,
        reason,
        actor.id,
        get_epoch_ts(),
    )
    .await?;
    let res = PunishmentResponse {
        success: true,
        message: format!("User has been given {}.", record.punishment_type),
        data: record,
    };
    Ok((StatusCode::CREATED, Json(res)))
}
