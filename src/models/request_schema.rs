use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{constants::*, utils::validate_otp_code};

use super::{OtpPurpose, PunishmentType};

/// request body schema for send & resend otp
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendOtpReq {
    #[validate(email)]
    pub email: String,

    pub purpose: OtpPurpose,

    /// optional name used to greet the receiver of the mail
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

/// request body schema for verify otp
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpReq {
    #[validate(email)]
    pub email: String,

    #[validate(custom(function = "validate_otp_code"))]
    pub code: String,

    pub purpose: OtpPurpose,
}

/// request body schema for check otp
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckOtpReq {
    #[validate(email)]
    pub email: String,

    pub purpose: OtpPurpose,
}

/// request body schema for password reset
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordReq {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = "PASSWORD_MIN_LEN", max = 128))]
    pub password: String,

    #[validate(must_match = "password")]
    pub password_confirmation: String,
}

/// request body schema for register
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterReq {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = "PASSWORD_MIN_LEN", max = 128))]
    pub password: String,

    #[validate(must_match = "password")]
    pub password_confirmation: String,
}

/// request body schema for login & purok leader login
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginReq {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// request body schema for renewing the token pair
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenReq {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// request body schema for applying a punishment
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SuspendUserReq {
    pub punishment_type: PunishmentType,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}
