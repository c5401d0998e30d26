use axum::{extract::State, Json};

use super::helper::check_purpose_allowed;
use crate::{
    models::{ErrorResponse, OtpSentData, OtpSentResponse, SendOtpReq},
    services::otp,
    state::AppState,
    utils::{get_epoch_ts, normalize_email, AppError, ValidatedBody},
};

/// Send otp
///
/// Mail a new 6 digit code for the purpose. Earlier unused codes stop working.
#[utoipa::path(
    post,
    path = "/otp/send",
    request_body = SendOtpReq,
    responses(
        (status = 200, description = "Otp sent", body = OtpSentResponse),
        (status = 400, description = "Email already registered", body = ErrorResponse),
        (status = 404, description = "No active account for the email", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Too many otp requests", body = ErrorResponse),
    ),
    tag = "OTP API"
)]
pub async fn send_otp_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<SendOtpReq>,
) -> Result<Json<OtpSentResponse>, AppError> {
    let data = dispatch(&state, body, false).await?;
    let res = OtpSentResponse {
        success: true,
        message: "OTP sent to your email.".to_owned(),
        data,
    };
    Ok(Json(res))
}

/// Resend otp
///
/// Same as send, counted against the same limit of 3 per 10 minutes.
#[utoipa::path(
    post,
    path = "/otp/resend",
    request_body = SendOtpReq,
    responses(
        (status = 200, description = "Otp sent again", body = OtpSentResponse),
        (status = 400, description = "Email already registered", body = ErrorResponse),
        (status = 404, description = "No active account for the email", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Too many otp requests", body = ErrorResponse),
    ),
    tag = "OTP API"
)]
pub async fn resend_otp_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<SendOtpReq>,
) -> Result<Json<OtpSentResponse>, AppError> {
    let data = dispatch(&state, body, true).await?;
    let res = OtpSentResponse {
        success: true,
        message: "A new OTP has been sent to your email.".to_owned(),
        data,
    };
    Ok(Json(res))
}

async fn dispatch(
    state: &AppState,
    body: SendOtpReq,
    is_resend: bool,
) -> Result<OtpSentData, AppError> {
    let email = normalize_email(&body.email);
    let user = check_purpose_allowed(state.store.as_ref(), &email, body.purpose).await?;
    let name = body.name.or(user.map(|user| user.name));
    let (store, mailer) = (state.store.as_ref(), state.mailer.as_ref());
    let now = get_epoch_ts();
    let issued = if is_resend {
        otp::resend(store, mailer, &email, body.purpose, name.as_deref(), now).await?
    } else {
        otp::send(store, mailer, &email, body.purpose, name.as_deref(), now).await?
    };
    Ok(OtpSentData {
        email: issued.email,
        purpose: issued.purpose,
        expires_in: issued.expires_in_mins,
    })
}
