use axum::{extract::State, Json};

use crate::{
    models::{CheckOtpReq, ErrorResponse, OtpCheckData, OtpCheckResponse},
    services::otp,
    state::AppState,
    utils::{get_epoch_ts, normalize_email, AppError, ValidatedBody},
};

/// Check otp
///
/// Tell whether a live code exists for the email and purpose, without consuming it.
#[utoipa::path(
    post,
    path = "/otp/check",
    request_body = CheckOtpReq,
    responses(
        (status = 200, description = "Otp status", body = OtpCheckResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
    ),
    tag = "OTP API"
)]
pub async fn check_otp_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<CheckOtpReq>,
) -> Result<Json<OtpCheckResponse>, AppError> {
    let email = normalize_email(&body.email);
    let status = otp::check(state.store.as_ref(), &email, body.purpose, get_epoch_ts()).await?;
    let message = if status.has_valid_otp {
        "A valid OTP exists."
    } else {
        "No valid OTP found."
    };
    let res = OtpCheckResponse {
        success: true,
        message: message.to_owned(),
        data: OtpCheckData {
            has_valid_otp: status.has_valid_otp,
            expires_in: status.expires_in_secs,
        },
    };
    Ok(Json(res))
}
