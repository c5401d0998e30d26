use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use super::{OtpPurpose, PunishmentRecord, PunishmentType, UserProfile};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenericResponse {
    pub success: bool,
    pub message: String,
}

/// response schema for every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,

    /// field level validation messages, keyed by field name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<JsonValue>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpSentData {
    pub email: String,
    pub purpose: OtpPurpose,
    /// minutes until the otp expires
    pub expires_in: u64,
}

/// response schema for send & resend otp
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpSentResponse {
    pub success: bool,
    pub message: String,
    pub data: OtpSentData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpVerifiedData {
    pub email: String,
    pub purpose: OtpPurpose,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,

    /// seconds until the reset token expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token_expires_in: Option<u64>,
}

/// response schema for verify otp
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpVerifiedResponse {
    pub success: bool,
    pub message: String,
    pub data: OtpVerifiedData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpCheckData {
    pub has_valid_otp: bool,
    /// seconds until the live otp expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// response schema for check otp
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpCheckResponse {
    pub success: bool,
    pub message: String,
    pub data: OtpCheckData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthData {
    pub user: UserProfile,
    pub token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// seconds until the access token expires
    pub expires_in: u64,
}

/// response schema for register, login & token renewal
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub data: AuthData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailablePunishmentsData {
    pub user_id: u32,
    pub available: Vec<PunishmentType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_suspension: Option<PunishmentRecord>,
}

/// response schema for available punishments of an user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailablePunishmentsResponse {
    pub success: bool,
    pub message: String,
    pub data: AvailablePunishmentsData,
}

/// response schema for suspend & revoke
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PunishmentResponse {
    pub success: bool,
    pub message: String,
    pub data: PunishmentRecord,
}

/// response schema for punishment history, newest first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PunishmentHistoryResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<PunishmentRecord>,
}
