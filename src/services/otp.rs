//! One time code lifecycle: `issued -> consumed | expired`.
//!
//! Expiry is never written, a code is simply not live anymore once `valid_till` is reached.

use std::fmt::{Display, Formatter, Result as FmtResult};

use super::rate_limit::{self, otp_key, OtpAction, RateLimitStatus};
use crate::{
    constants::*,
    mailer::{Mailer, OutgoingMail},
    models::{Otp, OtpPurpose, PasswordResetToken},
    store::{OtpStore, RateLimitStore, ResetTokenStore},
    utils::{constant_time_eq, env_or, generate_otp, generate_token, AppError},
};

#[derive(Debug)]
pub enum OtpError {
    RateLimited { retry_after: u64 },
    NotFoundOrExpired,
    Mismatch { attempts: u32 },
    Failed(anyhow::Error),
}

impl Display for OtpError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::RateLimited { retry_after } => {
                write!(f, "Too many attempts, retry in {retry_after} seconds")
            }
            Self::NotFoundOrExpired => write!(f, "OTP not found or has expired"),
            Self::Mismatch { .. } => write!(f, "Invalid OTP code"),
            Self::Failed(err) => write!(f, "OTP operation failed: {err}"),
        }
    }
}

impl From<anyhow::Error> for OtpError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(err)
    }
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::RateLimited { retry_after } => Self::RateLimited(retry_after),
            OtpError::NotFoundOrExpired => Self::NotFound(err.to_string()),
            OtpError::Mismatch { .. } => Self::BadRequestErr(err.to_string()),
            OtpError::Failed(err) => Self::AnyError(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OtpIssued {
    pub email: String,
    pub purpose: OtpPurpose,
    pub expires_in_mins: u64,
    pub valid_till: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtpVerified {
    Acknowledged,
    ResetToken(PasswordResetToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpStatus {
    pub has_valid_otp: bool,
    pub expires_in_secs: Option<u64>,
}

/// Issue a new code for the pair and mail it. Older unused codes of the pair stop working.
pub async fn send<S>(
    store: &S,
    mailer: &dyn Mailer,
    email: &str,
    purpose: OtpPurpose,
    display_name: Option<&str>,
    now: u64,
) -> Result<OtpIssued, OtpError>
where
    S: OtpStore + RateLimitStore + ?Sized,
{
    let key = otp_key(OtpAction::Send, purpose.as_str(), email);
    let status =
        rate_limit::attempt(store, &key, OTP_MAX_SENDS, OTP_RATE_WINDOW_SECS, now).await?;
    if let RateLimitStatus::Limited { retry_after } = status {
        return Err(OtpError::RateLimited { retry_after });
    }
    let code = generate_otp(OTP_LENGTH);
    let otp = Otp::new(email, purpose, &code, now);
    let replaced = store.replace_pending_otp(&otp).await?;
    tracing::debug!("Issued {purpose} otp for {email}, replaced {replaced} pending");
    let mail = OutgoingMail::otp(email, display_name, purpose, &code, OTP_VALIDITY_MINS);
    let dispatched = match mail {
        Ok(mail) => mailer.send(mail).await,
        Err(err) => Err(err),
    };
    if let Err(err) = dispatched {
        // the user never saw this code, it must not stay live
        store.delete_otp(&otp).await?;
        return Err(OtpError::Failed(err));
    }
    Ok(OtpIssued {
        email: email.to_owned(),
        purpose,
        expires_in_mins: OTP_VALIDITY_MINS,
        valid_till: otp.valid_till,
    })
}

/// Same contract as [`send`], sharing its rate limit counter
pub async fn resend<S>(
    store: &S,
    mailer: &dyn Mailer,
    email: &str,
    purpose: OtpPurpose,
    display_name: Option<&str>,
    now: u64,
) -> Result<OtpIssued, OtpError>
where
    S: OtpStore + RateLimitStore + ?Sized,
{
    send(store, mailer, email, purpose, display_name, now).await
}

pub async fn verify<S>(
    store: &S,
    email: &str,
    code: &str,
    purpose: OtpPurpose,
    now: u64,
) -> Result<OtpVerified, OtpError>
where
    S: OtpStore + RateLimitStore + ResetTokenStore + ?Sized,
{
    let otp = store
        .find_live_otp(email, purpose, now)
        .await?
        .ok_or(OtpError::NotFoundOrExpired)?;
    let key = otp_key(OtpAction::Verify, purpose.as_str(), email);
    let status =
        rate_limit::attempt(store, &key, OTP_MAX_VERIFY_ATTEMPTS, OTP_RATE_WINDOW_SECS, now)
            .await?;
    if let RateLimitStatus::Limited { retry_after } = status {
        return Err(OtpError::RateLimited { retry_after });
    }
    if !constant_time_eq(code, &otp.otp) {
        let attempts = store.record_otp_attempt(&otp).await?;
        tracing::debug!("Wrong {purpose} otp for {email}, attempt {attempts}");
        return Err(OtpError::Mismatch { attempts });
    }
    // a concurrent verify may have consumed it in between
    if !store.consume_otp(&otp, now).await? {
        return Err(OtpError::NotFoundOrExpired);
    }
    store.clear(&key).await?;
    if purpose != OtpPurpose::ForgotPassword {
        return Ok(OtpVerified::Acknowledged);
    }
    let validity = env_or("PASSWORD_RESET_TOKEN_EXPIRY", PASSWORD_RESET_TOKEN_EXPIRY);
    let token = generate_token(PASSWORD_RESET_TOKEN_LEN);
    let token = PasswordResetToken::new(token, email, now, validity);
    store.insert_reset_token(&token).await?;
    Ok(OtpVerified::ResetToken(token))
}

/// Read only lookup of the live code of the pair
pub async fn check<S>(
    store: &S,
    email: &str,
    purpose: OtpPurpose,
    now: u64,
) -> anyhow::Result<OtpStatus>
where
    S: OtpStore + ?Sized,
{
    let otp = store.find_live_otp(email, purpose, now).await?;
    let status = OtpStatus {
        has_valid_otp: otp.is_some(),
        expires_in_secs: otp.map(|otp| otp.seconds_left(now)),
    };
    Ok(status)
}
