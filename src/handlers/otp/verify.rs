use axum::{extract::State, Json};

use crate::{
    models::{ErrorResponse, OtpPurpose, OtpVerifiedData, OtpVerifiedResponse, VerifyOtpReq},
    services::otp::{self, OtpVerified},
    state::AppState,
    store::UserStore,
    utils::{get_epoch_ts, normalize_email, AppError, ValidatedBody},
};

/// Verify otp
///
/// Consume the code. For `forgot_password` the response carries a single use password reset token.
#[utoipa::path(
    post,
    path = "/otp/verify",
    request_body = VerifyOtpReq,
    responses(
        (status = 200, description = "Otp verified", body = OtpVerifiedResponse),
        (status = 400, description = "Wrong code", body = ErrorResponse),
        (status = 404, description = "No live otp for the email", body = ErrorResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Too many verify attempts", body = ErrorResponse),
    ),
    tag = "OTP API"
)]
pub async fn verify_otp_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<VerifyOtpReq>,
) -> Result<Json<OtpVerifiedResponse>, AppError> {
    let email = normalize_email(&body.email);
    let now = get_epoch_ts();
    let verified = otp::verify(state.store.as_ref(), &email, &body.code, body.purpose, now).await?;
    if body.purpose == OtpPurpose::EmailVerification {
        state.store.mark_email_verified(&email, now).await?;
    }
    let mut data = OtpVerifiedData {
        email,
        purpose: body.purpose,
        reset_token: None,
        reset_token_expires_in: None,
    };
    if let OtpVerified::ResetToken(token) = verified {
        data.reset_token_expires_in = Some(token.valid_till.saturating_sub(now));
        data.reset_token = Some(token.token);
    }
    let res = OtpVerifiedResponse {
        success: true,
        message: "OTP verified successfully.".to_owned(),
        data,
    };
    Ok(Json(res))
}
