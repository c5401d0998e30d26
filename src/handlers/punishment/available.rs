use axum::{
    extract::{Path, State},
    Json,
};

use super::helper::find_target;
use crate::{
    jwt::Moderator,
    models::{AvailablePunishmentsData, AvailablePunishmentsResponse, ErrorResponse},
    services::suspension::available_from_history,
    state::AppState,
    store::PunishmentStore,
    utils::{get_epoch_ts, AppError},
};

/// Available punishments
///
/// Punishment tiers that can still be given to the user, in escalation order.
/// Empty while the user serves an active punishment or after a permanent suspension.
#[utoipa::path(
    get,
    path = "/user/{id}/available-punishments",
    params(
        ("id" = u32, Path, description = "Id of the user"),
        ("authorization" = String, Header, description = "JWT token"),
    ),
    security(("authorization" = [])),
    responses(
        (status = 200, description = "Available punishments", body = AvailablePunishmentsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found or no permission", body = ErrorResponse),
    ),
    tag = "Punishment API"
)]
pub async fn available_punishments_handler(
    _moderator: Moderator,
    State(state): State<AppState>,
    Path(user_id): Path<u32>,
) -> Result<Json<AvailablePunishmentsResponse>, AppError> {
    find_target(state.store.as_ref(), user_id).await?;
    let now = get_epoch_ts();
    let history = state.store.punishment_history(user_id).await?;
    let available = available_from_history(&history, now);
    let active_suspension = history
        .into_iter()
        .find(|record| record.is_active(now));
    let res = AvailablePunishmentsResponse {
        success: true,
        message: "Available punishments retrieved.".to_owned(),
        data: AvailablePunishmentsData {
            user_id,
            available,
            active_suspension,
        },
    };
    Ok(Json(res))
}
