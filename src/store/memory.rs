//! In-process store used by tests and by `STORE_BACKEND=memory` for local runs.
//! State is lost on restart.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use super::{
    OtpStore, PunishmentStore, RateLimitHit, RateLimitStore, ResetTokenStore, UserStore,
};
use crate::models::{Otp, OtpPurpose, PasswordResetToken, PunishmentRecord, PunishmentStatus, User};

#[derive(Debug, Default)]
struct Collections {
    otps: Vec<Otp>,
    rate_limits: HashMap<String, RateLimitHit>,
    reset_tokens: Vec<PasswordResetToken>,
    users: Vec<User>,
    punishments: Vec<PunishmentRecord>,
    user_seq: u32,
    punishment_seq: u32,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }

    /// Every otp ever stored for the pair, oldest first
    pub fn otps_for(&self, email: &str, purpose: OtpPurpose) -> anyhow::Result<Vec<Otp>> {
        let inner = self.lock()?;
        let otps = inner
            .otps
            .iter()
            .filter(|otp| otp.email == email && otp.purpose == purpose)
            .cloned()
            .collect();
        Ok(otps)
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn find_live_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: u64,
    ) -> anyhow::Result<Option<Otp>> {
        let inner = self.lock()?;
        let otp = inner
            .otps
            .iter()
            .filter(|otp| otp.email == email && otp.purpose == purpose && otp.is_live(now))
            .max_by_key(|otp| otp.issued_at)
            .cloned();
        Ok(otp)
    }

    async fn replace_pending_otp(&self, otp: &Otp) -> anyhow::Result<u64> {
        let mut inner = self.lock()?;
        let before = inner.otps.len();
        inner.otps.retain(|stored| {
            !(stored.email == otp.email && stored.purpose == otp.purpose && !stored.is_used)
        });
        let replaced = (before - inner.otps.len()) as u64;
        inner.otps.push(otp.clone());
        Ok(replaced)
    }

    async fn delete_otp(&self, otp: &Otp) -> anyhow::Result<()> {
        self.lock()?
            .otps
            .retain(|stored| stored.id != otp.id || stored.is_used);
        Ok(())
    }

    async fn record_otp_attempt(&self, otp: &Otp) -> anyhow::Result<u32> {
        let mut inner = self.lock()?;
        let stored = inner
            .otps
            .iter_mut()
            .find(|stored| stored.id == otp.id)
            .ok_or(anyhow::anyhow!("Otp {} disappeared while verifying", otp.id))?;
        stored.attempt_count += 1;
        Ok(stored.attempt_count)
    }

    async fn consume_otp(&self, otp: &Otp, now: u64) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        let stored = inner
            .otps
            .iter_mut()
            .find(|stored| stored.id == otp.id && !stored.is_used);
        match stored {
            Some(stored) => {
                stored.is_used = true;
                stored.consumed_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_consumed_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        since: u64,
    ) -> anyhow::Result<Option<Otp>> {
        let inner = self.lock()?;
        let otp = inner
            .otps
            .iter()
            .filter(|otp| otp.email == email && otp.purpose == purpose && otp.is_used)
            .filter(|otp| otp.consumed_at.map_or(false, |ts| ts >= since))
            .max_by_key(|otp| otp.consumed_at)
            .cloned();
        Ok(otp)
    }

    async fn purge_otps(&self, cut_off: u64) -> anyhow::Result<u64> {
        let mut inner = self.lock()?;
        let before = inner.otps.len();
        inner.otps.retain(|otp| otp.valid_till >= cut_off);
        Ok((before - inner.otps.len()) as u64)
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(&self, key: &str, window_secs: u64, now: u64) -> anyhow::Result<RateLimitHit> {
        let mut inner = self.lock()?;
        let entry = inner
            .rate_limits
            .entry(key.to_owned())
            .or_insert(RateLimitHit {
                hits: 0,
                reset_at: now + window_secs,
            });
        if entry.reset_at <= now {
            entry.hits = 0;
            entry.reset_at = now + window_secs;
        }
        entry.hits += 1;
        Ok(*entry)
    }

    async fn clear(&self, key: &str) -> anyhow::Result<()> {
        self.lock()?.rate_limits.remove(key);
        Ok(())
    }

    async fn purge_elapsed(&self, now: u64) -> anyhow::Result<u64> {
        let mut inner = self.lock()?;
        let before = inner.rate_limits.len();
        inner.rate_limits.retain(|_, hit| hit.reset_at > now);
        Ok((before - inner.rate_limits.len()) as u64)
    }
}

#[async_trait]
impl ResetTokenStore for MemoryStore {
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> anyhow::Result<()> {
        self.lock()?.reset_tokens.push(token.clone());
        Ok(())
    }

    async fn take_reset_token(
        &self,
        email: &str,
        token: &str,
        now: u64,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let mut inner = self.lock()?;
        let idx = inner
            .reset_tokens
            .iter()
            .position(|t| t.email == email && t.token == token && t.is_live(now));
        Ok(idx.map(|idx| inner.reset_tokens.remove(idx)))
    }

    async fn delete_reset_tokens(&self, email: &str) -> anyhow::Result<u64> {
        let mut inner = self.lock()?;
        let before = inner.reset_tokens.len();
        inner.reset_tokens.retain(|t| t.email != email);
        Ok((before - inner.reset_tokens.len()) as u64)
    }

    async fn purge_reset_tokens(&self, cut_off: u64) -> anyhow::Result<u64> {
        let mut inner = self.lock()?;
        let before = inner.reset_tokens.len();
        inner.reset_tokens.retain(|t| t.valid_till >= cut_off);
        Ok((before - inner.reset_tokens.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn next_user_id(&self) -> anyhow::Result<u32> {
        let mut inner = self.lock()?;
        inner.user_seq += 1;
        Ok(inner.user_seq)
    }

    async fn find_user_by_id(&self, id: u32) -> anyhow::Result<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        // keep the sequence ahead of ids chosen by the caller
        inner.user_seq = inner.user_seq.max(user.id);
        inner.users.push(user.clone());
        Ok(true)
    }

    async fn update_password(&self, id: u32, password_hash: &str, now: u64) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(anyhow::anyhow!("User not found with id: {id}"))?;
        user.password_hash = password_hash.to_owned();
        user.updated_ts = Some(now);
        Ok(())
    }

    async fn bump_token_version(&self, id: u32) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if let Some(user) = inner.users.iter_mut().find(|user| user.id == id) {
            user.token_version += 1;
        }
        Ok(())
    }

    async fn mark_email_verified(&self, email: &str, now: u64) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if let Some(user) = inner.users.iter_mut().find(|user| user.email == email) {
            user.email_verified = true;
            user.updated_ts = Some(now);
        }
        Ok(())
    }

    async fn update_last_login(&self, id: u32, now: u64) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if let Some(user) = inner.users.iter_mut().find(|user| user.id == id) {
            user.last_login_time = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl PunishmentStore for MemoryStore {
    async fn next_punishment_id(&self) -> anyhow::Result<u32> {
        let mut inner = self.lock()?;
        inner.punishment_seq += 1;
        Ok(inner.punishment_seq)
    }

    async fn punishment_history(&self, user_id: u32) -> anyhow::Result<Vec<PunishmentRecord>> {
        let inner = self.lock()?;
        let mut history: Vec<_> = inner
            .punishments
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| (b.suspended_at, b.id).cmp(&(a.suspended_at, a.id)));
        Ok(history)
    }

    async fn insert_punishment(&self, record: &PunishmentRecord) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        let has_active = inner.punishments.iter().any(|stored| {
            stored.user_id == record.user_id && stored.status == PunishmentStatus::Active
        });
        if has_active && record.status == PunishmentStatus::Active {
            return Ok(false);
        }
        inner.punishments.push(record.clone());
        Ok(true)
    }

    async fn mark_punishment_expired(&self, id: u32) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        let stored = inner
            .punishments
            .iter_mut()
            .find(|stored| stored.id == id && stored.status == PunishmentStatus::Active);
        if let Some(stored) = stored {
            stored.status = PunishmentStatus::Expired;
        }
        Ok(())
    }

    async fn revoke_punishment(
        &self,
        id: u32,
        revoked_by: u32,
        now: u64,
    ) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        let stored = inner
            .punishments
            .iter_mut()
            .find(|stored| stored.id == id && stored.status == PunishmentStatus::Active);
        match stored {
            Some(stored) => {
                stored.status = PunishmentStatus::Revoked;
                stored.revoked_at = Some(now);
                stored.revoked_by = Some(revoked_by);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limit_window_restarts_after_reset() {
        let store = MemoryStore::new();
        let first = store.hit("k", 600, 1_000).await.unwrap();
        assert_eq!(first, RateLimitHit { hits: 1, reset_at: 1_600 });
        let second = store.hit("k", 600, 1_100).await.unwrap();
        assert_eq!(second, RateLimitHit { hits: 2, reset_at: 1_600 });
        let fresh = store.hit("k", 600, 1_600).await.unwrap();
        assert_eq!(fresh, RateLimitHit { hits: 1, reset_at: 2_200 });
    }

    #[tokio::test]
    async fn test_insert_punishment_keeps_one_stored_active() {
        let store = MemoryStore::new();
        let first = PunishmentRecord::new(1, 5, crate::models::PunishmentType::Warning1, None, 1, 0);
        let second = PunishmentRecord::new(2, 5, crate::models::PunishmentType::Warning2, None, 1, 0);
        assert!(store.insert_punishment(&first).await.unwrap());
        assert!(!store.insert_punishment(&second).await.unwrap());
        store.mark_punishment_expired(1).await.unwrap();
        assert!(store.insert_punishment(&second).await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_pending_otp_keeps_one_unused_code() {
        let store = MemoryStore::new();
        let first = Otp::new("a@b.com", OtpPurpose::Registration, "111111", 0);
        let second = Otp::new("a@b.com", OtpPurpose::Registration, "222222", 5);
        assert_eq!(store.replace_pending_otp(&first).await.unwrap(), 0);
        assert!(store.consume_otp(&first, 1).await.unwrap());
        assert_eq!(store.replace_pending_otp(&second).await.unwrap(), 0);
        let third = Otp::new("a@b.com", OtpPurpose::Registration, "333333", 9);
        assert_eq!(store.replace_pending_otp(&third).await.unwrap(), 1);
        let otps = store.otps_for("a@b.com", OtpPurpose::Registration).unwrap();
        assert_eq!(otps.iter().filter(|otp| !otp.is_used).count(), 1);
        // consumed history survives, a consumed code is never deleted
        store.delete_otp(&first).await.unwrap();
        store.delete_otp(&third).await.unwrap();
        let otps = store.otps_for("a@b.com", OtpPurpose::Registration).unwrap();
        assert_eq!(otps.len(), 1);
        assert!(otps[0].is_used);
    }

    #[tokio::test]
    async fn test_take_reset_token_is_single_use() {
        let store = MemoryStore::new();
        let token = PasswordResetToken::new("abc".into(), "a@b.com", 0, 60);
        store.insert_reset_token(&token).await.unwrap();
        assert!(store.take_reset_token("a@b.com", "abc", 59).await.unwrap().is_some());
        assert!(store.take_reset_token("a@b.com", "abc", 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_keeps_recent_entries() {
        let store = MemoryStore::new();
        let old = Otp::new("a@b.com", OtpPurpose::Registration, "111111", 0);
        let recent = Otp::new("a@b.com", OtpPurpose::ForgotPassword, "222222", 10_000);
        store.replace_pending_otp(&old).await.unwrap();
        store.replace_pending_otp(&recent).await.unwrap();
        assert_eq!(store.purge_otps(5_000).await.unwrap(), 1);
        assert_eq!(store.otps_for("a@b.com", OtpPurpose::ForgotPassword).unwrap().len(), 1);

        store.hit("old", 600, 0).await.unwrap();
        store.hit("new", 600, 1_000).await.unwrap();
        assert_eq!(store.purge_elapsed(1_000).await.unwrap(), 1);
        assert_eq!(store.hit("new", 600, 1_001).await.unwrap().hits, 2);
    }

    #[tokio::test]
    async fn test_insert_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        let user = User {
            id: 1,
            email: "a@b.com".into(),
            ..Default::default()
        };
        assert!(store.insert_user(&user).await.unwrap());
        let dup = User { id: 2, ..user };
        assert!(!store.insert_user(&dup).await.unwrap());
        assert_eq!(store.next_user_id().await.unwrap(), 2);
    }
}
