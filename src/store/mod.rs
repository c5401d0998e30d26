//! Persistence seams of the service.
//!
//! Every trait is implemented by the MongoDB backed [`AppDatabase`](crate::database::AppDatabase)
//! and by the in-process [`MemoryStore`](memory::MemoryStore). Services are generic over
//! the traits they need, handlers hold an `Arc<dyn Store>`.

use async_trait::async_trait;

use crate::models::{Otp, OtpPurpose, PasswordResetToken, PunishmentRecord, User};

#[cfg(test)]
use mockall::automock;

pub mod memory;
pub mod mongo;

/// State of a rate limit window after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHit {
    pub hits: u32,
    pub reset_at: u64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Newest unused otp for the pair whose `valid_till` is after `now`
    async fn find_live_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: u64,
    ) -> anyhow::Result<Option<Otp>>;

    /// Store `otp` as the only unused code of its pair, returns how many older unused codes it replaced
    async fn replace_pending_otp(&self, otp: &Otp) -> anyhow::Result<u64>;

    /// Remove `otp` unless it was consumed already
    async fn delete_otp(&self, otp: &Otp) -> anyhow::Result<()>;

    /// Increment `attempt_count` and return the new value
    async fn record_otp_attempt(&self, otp: &Otp) -> anyhow::Result<u32>;

    /// Mark the otp used if it still is unused. `false` means someone else consumed it first.
    async fn consume_otp(&self, otp: &Otp, now: u64) -> anyhow::Result<bool>;

    /// Newest otp of the pair consumed at or after `since`
    async fn find_consumed_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        since: u64,
    ) -> anyhow::Result<Option<Otp>>;

    /// Delete otps, used or not, whose validity ended before `cut_off`
    async fn purge_otps(&self, cut_off: u64) -> anyhow::Result<u64>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Atomically count a hit on `key`. A window starts on the first hit and
    /// lasts `window_secs`; a hit after the window ends starts a new one.
    async fn hit(&self, key: &str, window_secs: u64, now: u64) -> anyhow::Result<RateLimitHit>;

    async fn clear(&self, key: &str) -> anyhow::Result<()>;

    /// Delete counters whose window is over
    async fn purge_elapsed(&self, now: u64) -> anyhow::Result<u64>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> anyhow::Result<()>;

    /// Remove and return the token if it belongs to `email` and is still live
    async fn take_reset_token(
        &self,
        email: &str,
        token: &str,
        now: u64,
    ) -> anyhow::Result<Option<PasswordResetToken>>;

    async fn delete_reset_tokens(&self, email: &str) -> anyhow::Result<u64>;

    /// Delete tokens whose validity ended before `cut_off`
    async fn purge_reset_tokens(&self, cut_off: u64) -> anyhow::Result<u64>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn next_user_id(&self) -> anyhow::Result<u32>;

    async fn find_user_by_id(&self, id: u32) -> anyhow::Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// `false` when the email is already taken
    async fn insert_user(&self, user: &User) -> anyhow::Result<bool>;

    async fn update_password(&self, id: u32, password_hash: &str, now: u64) -> anyhow::Result<()>;

    /// Invalidate every token issued to the user so far
    async fn bump_token_version(&self, id: u32) -> anyhow::Result<()>;

    async fn mark_email_verified(&self, email: &str, now: u64) -> anyhow::Result<()>;

    async fn update_last_login(&self, id: u32, now: u64) -> anyhow::Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PunishmentStore: Send + Sync {
    async fn next_punishment_id(&self) -> anyhow::Result<u32>;

    /// Every punishment of the user, newest first, statuses as stored
    async fn punishment_history(&self, user_id: u32) -> anyhow::Result<Vec<PunishmentRecord>>;

    /// `false` when the user already has a stored active record
    async fn insert_punishment(&self, record: &PunishmentRecord) -> anyhow::Result<bool>;

    /// Write `expired` over a stored active record whose time has lapsed
    async fn mark_punishment_expired(&self, id: u32) -> anyhow::Result<()>;

    /// Flip a stored active record to revoked, `false` if it was not active anymore
    async fn revoke_punishment(&self, id: u32, revoked_by: u32, now: u64)
        -> anyhow::Result<bool>;
}

/// Everything the handlers need from persistence
pub trait Store: OtpStore + RateLimitStore + ResetTokenStore + UserStore + PunishmentStore {}

impl<T> Store for T where T: OtpStore + RateLimitStore + ResetTokenStore + UserStore + PunishmentStore
{}
