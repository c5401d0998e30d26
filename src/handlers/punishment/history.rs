use axum::{
    extract::{Path, State},
    Json,
};

use super::helper::find_target;
use crate::{
    jwt::Moderator,
    models::{ErrorResponse, PunishmentHistoryResponse},
    services::suspension,
    state::AppState,
    utils::{get_epoch_ts, AppError},
};

/// Punishment history
///
/// Every punishment the user ever received, newest first
#[utoipa::path(
    get,
    path = "/user/{id}/suspensions",
    params(
        ("id" = u32, Path, description = "Id of the user"),
        ("authorization" = String, Header, description = "JWT token"),
    ),
    security(("authorization" = [])),
    responses(
        (status = 200, description = "Punishment history", body = PunishmentHistoryResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found or no permission", body = ErrorResponse),
    ),
    tag = "Punishment API"
)]
pub async fn punishment_history_handler(
    _moderator: Moderator,
    State(state): State<AppState>,
    Path(user_id): Path<u32>,
) -> Result<Json<PunishmentHistoryResponse>, AppError> {
    find_target(state.store.as_ref(), user_id).await?;
    let data = suspension::history(state.store.as_ref(), user_id, get_epoch_ts()).await?;
    let res = PunishmentHistoryResponse {
        success: true,
        message: "Punishment history retrieved.".to_owned(),
        data,
    };
    Ok(Json(res))
}
