use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

use crate::constants::*;

/// What an otp is going to prove once verified
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    ForgotPassword,
    EmailVerification,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::ForgotPassword => "forgot_password",
            Self::EmailVerification => "email_verification",
        }
    }

    /// Human readable subject line fragment used in mails
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Registration => "account registration",
            Self::ForgotPassword => "password reset",
            Self::EmailVerification => "email verification",
        }
    }
}

impl Display for OtpPurpose {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Otp {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub purpose: OtpPurpose,
    pub otp: String,
    pub issued_at: u64,
    pub valid_till: u64,
    pub is_used: bool,
    pub attempt_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<u64>,
}

impl Otp {
    pub fn new(email: &str, purpose: OtpPurpose, otp: &str, now: u64) -> Self {
        Self {
            id: ObjectId::new(),
            email: email.to_owned(),
            purpose,
            otp: otp.to_string(),
            issued_at: now,
            valid_till: now + OTP_VALIDITY_MINS * 60,
            is_used: false,
            attempt_count: 0,
            consumed_at: None,
        }
    }

    /// An otp is live while it is unused and `now` has not reached `valid_till`
    pub fn is_live(&self, now: u64) -> bool {
        !self.is_used && now < self.valid_till
    }

    pub fn seconds_left(&self, now: u64) -> u64 {
        self.valid_till.saturating_sub(now)
    }
}

/// Single use token handed out after a forgot_password otp is verified
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordResetToken {
    pub token: String,
    pub email: String,
    pub created_at: u64,
    pub valid_till: u64,
}

impl PasswordResetToken {
    pub fn new(token: String, email: &str, now: u64, validity_secs: u64) -> Self {
        Self {
            token,
            email: email.to_owned(),
            created_at: now,
            valid_till: now + validity_secs,
        }
    }

    pub fn is_live(&self, now: u64) -> bool {
        now < self.valid_till
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_otp_expires_after_validity_window() {
        let otp = Otp::new("a@b.com", OtpPurpose::Registration, "123456", 1_000);
        assert_eq!(otp.valid_till, 1_000 + 600);
        assert!(otp.is_live(1_000));
        assert!(otp.is_live(1_599));
        assert!(!otp.is_live(1_600));
        assert_eq!(otp.seconds_left(1_300), 300);
        assert_eq!(otp.seconds_left(5_000), 0);
    }

    #[test]
    fn test_used_otp_is_not_live() {
        let mut otp = Otp::new("a@b.com", OtpPurpose::ForgotPassword, "123456", 1_000);
        otp.is_used = true;
        assert!(!otp.is_live(1_001));
    }

    #[test]
    fn test_purpose_wire_names() {
        let json = serde_json::to_string(&OtpPurpose::ForgotPassword).unwrap();
        assert_eq!(json, "\"forgot_password\"");
        let purpose: OtpPurpose = serde_json::from_str("\"email_verification\"").unwrap();
        assert_eq!(purpose, OtpPurpose::EmailVerification);
        assert_eq!(OtpPurpose::Registration.to_string(), "registration");
    }
}
