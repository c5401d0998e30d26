//! Progressive punishment: `warning_1 -> warning_2 -> suspension`.
//!
//! History is permanent. A tier, once issued, is never offered again and neither
//! is anything below the highest tier issued so far. Expiry is evaluated against
//! `now` on every read, a stored `active` record may already be over.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{
    models::{PunishmentRecord, PunishmentStatus, PunishmentType},
    store::{PunishmentStore, UserStore},
    utils::AppError,
};

#[derive(Debug)]
pub enum SuspensionError {
    AlreadySuspended,
    InvalidTransition(String),
    Failed(anyhow::Error),
}

impl Display for SuspensionError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::AlreadySuspended => write!(f, "User already has an active punishment"),
            Self::InvalidTransition(msg) => write!(f, "{msg}"),
            Self::Failed(err) => write!(f, "Punishment operation failed: {err}"),
        }
    }
}

impl From<anyhow::Error> for SuspensionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(err)
    }
}

impl From<SuspensionError> for AppError {
    fn from(err: SuspensionError) -> Self {
        match err {
            SuspensionError::Failed(err) => Self::AnyError(err),
            err => Self::BadRequestErr(err.to_string()),
        }
    }
}

/// Tiers that can still be issued given the full history
pub fn available_from_history(history: &[PunishmentRecord], now: u64) -> Vec<PunishmentType> {
    if history.iter().any(|record| record.is_active(now)) {
        return vec![];
    }
    let highest = history.iter().map(|record| record.punishment_type).max();
    PunishmentType::ESCALATION
        .into_iter()
        .filter(|tier| highest.map_or(true, |highest| *tier > highest))
        .collect()
}

pub async fn available_punishments<S>(
    store: &S,
    user_id: u32,
    now: u64,
) -> anyhow::Result<Vec<PunishmentType>>
where
    S: PunishmentStore + ?Sized,
{
    let history = store.punishment_history(user_id).await?;
    Ok(available_from_history(&history, now))
}

/// Issue `punishment_type` to the user and log them out everywhere
pub async fn apply<S>(
    store: &S,
    user_id: u32,
    punishment_type: PunishmentType,
    reason: Option<String>,
    actor_id: u32,
    now: u64,
) -> Result<PunishmentRecord, SuspensionError>
where
    S: PunishmentStore + UserStore + ?Sized,
{
    let history = store.punishment_history(user_id).await?;
    if history.iter().any(|record| record.is_active(now)) {
        return Err(SuspensionError::AlreadySuspended);
    }
    if !available_from_history(&history, now).contains(&punishment_type) {
        let msg = format!("Punishment {punishment_type} is not available for this user");
        return Err(SuspensionError::InvalidTransition(msg));
    }
    // a lapsed record still stored as active would block the insert
    for lapsed in history
        .iter()
        .filter(|record| record.status == PunishmentStatus::Active)
    {
        store.mark_punishment_expired(lapsed.id).await?;
    }
    let id = store.next_punishment_id().await?;
    let record = PunishmentRecord::new(id, user_id, punishment_type, reason, actor_id, now);
    if !store.insert_punishment(&record).await? {
        return Err(SuspensionError::AlreadySuspended);
    }
    store.bump_token_version(user_id).await?;
    tracing::info!("User {actor_id} issued {punishment_type} to user {user_id}");
    Ok(record)
}

/// Newest first, statuses as of `now`
pub async fn history<S>(store: &S, user_id: u32, now: u64) -> anyhow::Result<Vec<PunishmentRecord>>
where
    S: PunishmentStore + ?Sized,
{
    let history = store
        .punishment_history(user_id)
        .await?
        .into_iter()
        .map(|record| record.resolved(now))
        .collect();
    Ok(history)
}

pub async fn active_suspension<S>(
    store: &S,
    user_id: u32,
    now: u64,
) -> anyhow::Result<Option<PunishmentRecord>>
where
    S: PunishmentStore + ?Sized,
{
    let history = store.punishment_history(user_id).await?;
    Ok(history.into_iter().find(|record| record.is_active(now)))
}

pub async fn revoke<S>(
    store: &S,
    user_id: u32,
    actor_id: u32,
    now: u64,
) -> Result<PunishmentRecord, SuspensionError>
where
    S: PunishmentStore + ?Sized,
{
    let no_active = || SuspensionError::InvalidTransition("User has no active punishment".into());
    let mut record = active_suspension(store, user_id, now)
        .await?
        .ok_or_else(no_active)?;
    if !store.revoke_punishment(record.id, actor_id, now).await? {
        return Err(no_active());
    }
    record.status = PunishmentStatus::Revoked;
    record.revoked_at = Some(now);
    record.revoked_by = Some(actor_id);
    tracing::info!("User {actor_id} revoked {} of user {user_id}", record.punishment_type);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::User,
        store::{memory::MemoryStore, MockPunishmentStore},
    };
    use crate::models::PunishmentType::*;

    const DAY: u64 = 24 * 3600;

    async fn store_with_user(id: u32) -> MemoryStore {
        let store = MemoryStore::new();
        let user = User {
            id,
            email: format!("user{id}@example.com"),
            is_active: true,
            ..Default::default()
        };
        store.insert_user(&user).await.unwrap();
        store
    }

    fn issued(id: u32, punishment_type: PunishmentType, status: PunishmentStatus) -> PunishmentRecord {
        let mut record = PunishmentRecord::new(id, 5, punishment_type, None, 1, id as u64);
        record.status = status;
        record
    }

    #[test]
    fn test_escalation_table() {
        use crate::models::PunishmentStatus::*;
        let now = 100 * DAY;
        assert_eq!(available_from_history(&[], now), vec![Warning1, Warning2, Suspension]);
        let w1 = [issued(1, Warning1, Expired)];
        assert_eq!(available_from_history(&w1, now), vec![Warning2, Suspension]);
        let w1_w2 = [issued(2, Warning2, Revoked), issued(1, Warning1, Expired)];
        assert_eq!(available_from_history(&w1_w2, now), vec![Suspension]);
        let terminal = [issued(1, Suspension, Revoked)];
        assert!(available_from_history(&terminal, now).is_empty());
    }

    #[test]
    fn test_active_record_blocks_everything() {
        let active = PunishmentRecord::new(1, 5, Warning1, None, 1, 0);
        assert!(available_from_history(&[active.clone()], 3 * DAY).is_empty());
        // the same stored record stops counting once it lapses
        assert_eq!(
            available_from_history(&[active], 3 * DAY + 1),
            vec![Warning2, Suspension]
        );
    }

    #[test]
    fn test_skipped_tier_is_not_offered_again() {
        let w2 = [issued(1, Warning2, PunishmentStatus::Expired)];
        assert_eq!(available_from_history(&w2, 100 * DAY), vec![Suspension]);
    }

    #[tokio::test]
    async fn test_user_five_warning_then_already_suspended() {
        let store = store_with_user(5).await;
        let now = 1_000;
        let record = apply(&store, 5, Warning1, Some("spam".into()), 1, now)
            .await
            .unwrap();
        assert_eq!(record.expires_at, Some(now + 3 * DAY));
        assert_eq!(record.status, PunishmentStatus::Active);
        let err = apply(&store, 5, Warning2, None, 1, now + 1).await.unwrap_err();
        assert!(matches!(err, SuspensionError::AlreadySuspended));
        // tokens issued before the punishment are revoked
        let user = store.find_user_by_id(5).await.unwrap().unwrap();
        assert_eq!(user.token_version, 1);
    }

    #[tokio::test]
    async fn test_already_suspended_wins_over_invalid_transition() {
        let store = store_with_user(5).await;
        apply(&store, 5, Warning2, None, 1, 0).await.unwrap();
        let err = apply(&store, 5, Warning1, None, 1, 10).await.unwrap_err();
        assert!(matches!(err, SuspensionError::AlreadySuspended));
    }

    #[tokio::test]
    async fn test_next_tier_after_lapse() {
        let store = store_with_user(5).await;
        apply(&store, 5, Warning1, None, 1, 0).await.unwrap();
        let later = 3 * DAY + 1;
        let err = apply(&store, 5, Warning1, None, 1, later).await.unwrap_err();
        assert!(matches!(err, SuspensionError::InvalidTransition(_)));
        let record = apply(&store, 5, Warning2, None, 1, later).await.unwrap();
        assert_eq!(record.expires_at, Some(later + 7 * DAY));

        let history = history(&store, 5, later).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].punishment_type, Warning2);
        assert_eq!(history[1].status, PunishmentStatus::Expired);
    }

    #[tokio::test]
    async fn test_permanent_suspension_is_terminal() {
        let store = store_with_user(5).await;
        let record = apply(&store, 5, Suspension, None, 1, 0).await.unwrap();
        assert_eq!(record.expires_at, None);
        let active = active_suspension(&store, 5, u64::MAX).await.unwrap();
        assert_eq!(active.map(|r| r.id), Some(record.id));
        assert!(available_punishments(&store, 5, u64::MAX)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_revoke_active_record() {
        let store = store_with_user(5).await;
        apply(&store, 5, Warning1, None, 1, 0).await.unwrap();
        let revoked = revoke(&store, 5, 2, 60).await.unwrap();
        assert_eq!(revoked.status, PunishmentStatus::Revoked);
        assert_eq!(revoked.revoked_by, Some(2));
        assert!(active_suspension(&store, 5, 61).await.unwrap().is_none());
        assert_eq!(
            available_punishments(&store, 5, 61).await.unwrap(),
            vec![Warning2, Suspension]
        );
        let err = revoke(&store, 5, 2, 62).await.unwrap_err();
        assert!(matches!(err, SuspensionError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_revoke_after_lapse_is_invalid() {
        let store = store_with_user(5).await;
        apply(&store, 5, Warning1, None, 1, 0).await.unwrap();
        let err = revoke(&store, 5, 2, 3 * DAY + 1).await.unwrap_err();
        assert!(matches!(err, SuspensionError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_failed() {
        let mut store = MockPunishmentStore::new();
        store
            .expect_punishment_history()
            .returning(|_| Err(anyhow::anyhow!("db down")));
        let err = revoke(&store, 5, 2, 0).await.unwrap_err();
        assert!(matches!(err, SuspensionError::Failed(_)));
        let app_err: AppError = err.into();
        assert_eq!(
            app_err.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
