use async_trait::async_trait;
use mockall_double::double;
use mongodb::{
    bson::{doc, Document},
    options::{
        FindOneAndUpdateOptions, FindOneOptions, FindOptions, ReturnDocument, UpdateModifications,
    },
};

use super::{
    OtpStore, PunishmentStore, RateLimitHit, RateLimitStore, ResetTokenStore, UserStore,
};
use crate::{
    constants::*,
    database::is_duplicate_key,
    models::{Otp, OtpPurpose, PasswordResetToken, PunishmentRecord, PunishmentStatus, User},
    utils::next_seq_val,
};

#[double]
use crate::database::AppDatabase;

#[async_trait]
impl OtpStore for AppDatabase {
    async fn find_live_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: u64,
    ) -> anyhow::Result<Option<Otp>> {
        let filter = doc! {
            "email": email,
            "purpose": purpose.as_str(),
            "is_used": false,
            "valid_till": {"$gt": now as i64},
        };
        let mut options = FindOneOptions::default();
        options.sort = Some(doc! {"issued_at": -1});
        let otp = self
            .find_one::<Otp>(DB_NAME, COLL_OTP, Some(filter), Some(options))
            .await?;
        Ok(otp)
    }

    async fn replace_pending_otp(&self, otp: &Otp) -> anyhow::Result<u64> {
        let pending = doc! {
            "email": otp.email.as_str(),
            "purpose": otp.purpose.as_str(),
            "is_used": false,
        };
        // a concurrent send of the pair makes the insert fail on the unused code index
        for _ in 0..OTP_STORE_ATTEMPTS {
            let replaced = self.delete_many(DB_NAME, COLL_OTP, pending.clone()).await?;
            match self.insert_one::<Otp>(DB_NAME, COLL_OTP, otp).await {
                Ok(()) => return Ok(replaced),
                Err(err) if is_duplicate_key(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        let err = anyhow::anyhow!("Not able to store {} otp for {}", otp.purpose, otp.email);
        Err(err)
    }

    async fn delete_otp(&self, otp: &Otp) -> anyhow::Result<()> {
        let filter = doc! {"_id": otp.id, "is_used": false};
        self.delete_many(DB_NAME, COLL_OTP, filter).await?;
        Ok(())
    }

    async fn record_otp_attempt(&self, otp: &Otp) -> anyhow::Result<u32> {
        let filter = doc! {"_id": otp.id};
        let update = doc! {"$inc": {"attempt_count": 1}}.into();
        let mut options = FindOneAndUpdateOptions::default();
        options.return_document = Some(ReturnDocument::After);
        let updated = self
            .find_one_and_update::<Otp>(DB_NAME, COLL_OTP, filter, update, Some(options))
            .await?
            .ok_or(anyhow::anyhow!("Otp {} disappeared while verifying", otp.id))?;
        Ok(updated.attempt_count)
    }

    async fn consume_otp(&self, otp: &Otp, now: u64) -> anyhow::Result<bool> {
        let filter = doc! {"_id": otp.id, "is_used": false};
        let update = doc! {"$set": {"is_used": true, "consumed_at": now as i64}};
        let matched = self.update_one(DB_NAME, COLL_OTP, filter, update).await?;
        Ok(matched == 1)
    }

    async fn find_consumed_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        since: u64,
    ) -> anyhow::Result<Option<Otp>> {
        let filter = doc! {
            "email": email,
            "purpose": purpose.as_str(),
            "is_used": true,
            "consumed_at": {"$gte": since as i64},
        };
        let mut options = FindOneOptions::default();
        options.sort = Some(doc! {"consumed_at": -1});
        let otp = self
            .find_one::<Otp>(DB_NAME, COLL_OTP, Some(filter), Some(options))
            .await?;
        Ok(otp)
    }

    async fn purge_otps(&self, cut_off: u64) -> anyhow::Result<u64> {
        let filter = doc! {"valid_till": {"$lt": cut_off as i64}};
        let deleted = self.delete_many(DB_NAME, COLL_OTP, filter).await?;
        Ok(deleted)
    }
}

#[async_trait]
impl RateLimitStore for AppDatabase {
    async fn hit(&self, key: &str, window_secs: u64, now: u64) -> anyhow::Result<RateLimitHit> {
        let now = now as i64;
        let reset_at = now + window_secs as i64;
        // a single pipeline update both restarts an elapsed window and counts the hit,
        // on insert `$reset_at` is missing so the window starts fresh
        let in_window = doc! {"$gt": ["$reset_at", now]};
        let pipeline = vec![doc! {
            "$set": {
                "hits": {"$cond": [in_window.clone(), {"$add": ["$hits", 1]}, 1]},
                "reset_at": {"$cond": [in_window, "$reset_at", reset_at]},
            }
        }];
        let mut options = FindOneAndUpdateOptions::default();
        options.upsert = Some(true);
        options.return_document = Some(ReturnDocument::After);
        let filter = doc! {"_id": key};
        let result = self
            .find_one_and_update::<Document>(
                DB_NAME,
                COLL_RATE_LIMITS,
                filter,
                UpdateModifications::Pipeline(pipeline),
                Some(options),
            )
            .await?
            .ok_or(anyhow::anyhow!("Not able to count rate limit hit for {key}"))?;
        let hits = match result.get_i64("hits") {
            Ok(hits) => hits,
            Err(_) => result.get_i32("hits")? as i64,
        };
        let reset_at = result.get_i64("reset_at")?;
        Ok(RateLimitHit {
            hits: hits as u32,
            reset_at: reset_at as u64,
        })
    }

    async fn clear(&self, key: &str) -> anyhow::Result<()> {
        self.delete_many(DB_NAME, COLL_RATE_LIMITS, doc! {"_id": key})
            .await?;
        Ok(())
    }

    async fn purge_elapsed(&self, now: u64) -> anyhow::Result<u64> {
        let filter = doc! {"reset_at": {"$lte": now as i64}};
        let deleted = self
            .delete_many(DB_NAME, COLL_RATE_LIMITS, filter)
            .await?;
        Ok(deleted)
    }
}

#[async_trait]
impl ResetTokenStore for AppDatabase {
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> anyhow::Result<()> {
        self.insert_one::<PasswordResetToken>(DB_NAME, COLL_PASSWORD_RESETS, token)
            .await?;
        Ok(())
    }

    async fn take_reset_token(
        &self,
        email: &str,
        token: &str,
        now: u64,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let filter = doc! {"email": email, "token": token, "valid_till": {"$gt": now as i64}};
        let token = self
            .find_one_and_delete::<PasswordResetToken>(DB_NAME, COLL_PASSWORD_RESETS, filter)
            .await?;
        Ok(token)
    }

    async fn delete_reset_tokens(&self, email: &str) -> anyhow::Result<u64> {
        let deleted = self
            .delete_many(DB_NAME, COLL_PASSWORD_RESETS, doc! {"email": email})
            .await?;
        Ok(deleted)
    }

    async fn purge_reset_tokens(&self, cut_off: u64) -> anyhow::Result<u64> {
        let filter = doc! {"valid_till": {"$lt": cut_off as i64}};
        let deleted = self
            .delete_many(DB_NAME, COLL_PASSWORD_RESETS, filter)
            .await?;
        Ok(deleted)
    }
}

#[async_trait]
impl UserStore for AppDatabase {
    async fn next_user_id(&self) -> anyhow::Result<u32> {
        next_seq_val(USER_ID_SEQ, self).await
    }

    async fn find_user_by_id(&self, id: u32) -> anyhow::Result<Option<User>> {
        let filter = Some(doc! {"id": id});
        let user = self
            .find_one::<User>(DB_NAME, COLL_USERS, filter, None)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let filter = Some(doc! {"email": email});
        let user = self
            .find_one::<User>(DB_NAME, COLL_USERS, filter, None)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<bool> {
        match self.insert_one::<User>(DB_NAME, COLL_USERS, user).await {
            Ok(()) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_password(&self, id: u32, password_hash: &str, now: u64) -> anyhow::Result<()> {
        let filter = doc! {"id": id};
        let update = doc! {"$set": {"password_hash": password_hash, "updated_ts": now as i64}};
        let matched = self.update_one(DB_NAME, COLL_USERS, filter, update).await?;
        if matched == 0 {
            return Err(anyhow::anyhow!("User not found with id: {id}"));
        }
        Ok(())
    }

    async fn bump_token_version(&self, id: u32) -> anyhow::Result<()> {
        let filter = doc! {"id": id};
        let update = doc! {"$inc": {"token_version": 1}};
        self.update_one(DB_NAME, COLL_USERS, filter, update).await?;
        Ok(())
    }

    async fn mark_email_verified(&self, email: &str, now: u64) -> anyhow::Result<()> {
        let filter = doc! {"email": email};
        let update = doc! {"$set": {"email_verified": true, "updated_ts": now as i64}};
        self.update_one(DB_NAME, COLL_USERS, filter, update).await?;
        Ok(())
    }

    async fn update_last_login(&self, id: u32, now: u64) -> anyhow::Result<()> {
        let filter = doc! {"id": id};
        let update = doc! {"$set": {"last_login_time": now as i64}};
        self.update_one(DB_NAME, COLL_USERS, filter, update).await?;
        Ok(())
    }
}

#[async_trait]
impl PunishmentStore for AppDatabase {
    async fn next_punishment_id(&self) -> anyhow::Result<u32> {
        next_seq_val(PUNISHMENT_ID_SEQ, self).await
    }

    async fn punishment_history(&self, user_id: u32) -> anyhow::Result<Vec<PunishmentRecord>> {
        let mut options = FindOptions::default();
        options.sort = Some(doc! {"suspended_at": -1, "id": -1});
        let filter = Some(doc! {"user_id": user_id});
        let history = self
            .find::<PunishmentRecord>(DB_NAME, COLL_PUNISHMENTS, filter, Some(options))
            .await?;
        Ok(history)
    }

    async fn insert_punishment(&self, record: &PunishmentRecord) -> anyhow::Result<bool> {
        let result = self
            .insert_one::<PunishmentRecord>(DB_NAME, COLL_PUNISHMENTS, record)
            .await;
        match result {
            Ok(()) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn mark_punishment_expired(&self, id: u32) -> anyhow::Result<()> {
        let active = PunishmentStatus::Active.as_str();
        let filter = doc! {"id": id, "status": active};
        let expired = PunishmentStatus::Expired.as_str();
        let update = doc! {"$set": {"status": expired}};
        self.update_one(DB_NAME, COLL_PUNISHMENTS, filter, update)
            .await?;
        Ok(())
    }

    async fn revoke_punishment(
        &self,
        id: u32,
        revoked_by: u32,
        now: u64,
    ) -> anyhow::Result<bool> {
        let active = PunishmentStatus::Active.as_str();
        let filter = doc! {"id": id, "status": active};
        let revoked = PunishmentStatus::Revoked.as_str();
        let update = doc! {"$set": {
            "status": revoked,
            "revoked_at": now as i64,
            "revoked_by": revoked_by,
        }};
        let matched = self
            .update_one(DB_NAME, COLL_PUNISHMENTS, filter, update)
            .await?;
        Ok(matched == 1)
    }
}
