use axum::{
    extract::{Path, State},
    Json,
};

use super::helper::find_target;
use crate::{
    jwt::Moderator,
    models::{ErrorResponse, PunishmentResponse},
    services::suspension,
    state::AppState,
    utils::{get_epoch_ts, AppError},
};

/// Revoke suspension
///
/// Lift the active punishment of the user. The record stays in the history as `revoked`.
#[utoipa::path(
    post,
    path = "/user/{id}/revoke-suspension",
    params(
        ("id" = u32, Path, description = "Id of the user"),
        ("authorization" = String, Header, description = "JWT token"),
    ),
    security(("authorization" = [])),
    responses(
        (status = 200, description = "Punishment revoked", body = PunishmentResponse),
        (status = 400, description = "No active punishment", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found or no permission", body = ErrorResponse),
    ),
    tag = "Punishment API"
)]
pub async fn revoke_suspension_handler(
    Moderator(actor): Moderator,
    State(state): State<AppState>,
    Path(user_id): Path<u32>,
) -> Result<Json<PunishmentResponse>, AppError> {
    find_target(state.store.as_ref(), user_id).await?;
    let record =
        suspension::revoke(state.store.as_ref(), user_id, actor.id, get_epoch_ts()).await?;
    let res = PunishmentResponse {
        success: true,
        message: "Punishment revoked.".to_owned(),
        data: record,
    };
    Ok(Json(res))
}
