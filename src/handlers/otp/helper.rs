use crate::{
    models::{OtpPurpose, User},
    store::{Store, UserStore},
    utils::AppError,
};

/// Registration codes go to unused emails only, every other purpose needs an active account.
/// Returns the account when there is one.
pub async fn check_purpose_allowed(
    store: &dyn Store,
    email: &str,
    purpose: OtpPurpose,
) -> Result<Option<User>, AppError> {
    let user = store.find_user_by_email(email).await?;
    match (purpose, user) {
        (OtpPurpose::Registration, Some(_)) => {
            let err = AppError::BadRequestErr("The email has already been taken.".into());
            Err(err)
        }
        (OtpPurpose::Registration, None) => Ok(None),
        (_, Some(user)) if user.is_active => Ok(Some(user)),
        (_, _) => {
            let err = format!("No active account found with email: {email}");
            Err(AppError::NotFound(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let active = User {
            id: 1,
            email: "active@example.com".into(),
            is_active: true,
            ..Default::default()
        };
        let inactive = User {
            id: 2,
            email: "inactive@example.com".into(),
            ..Default::default()
        };
        store.insert_user(&active).await.unwrap();
        store.insert_user(&inactive).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_registration_needs_unused_email() {
        let store = store().await;
        let res = check_purpose_allowed(&store, "new@example.com", OtpPurpose::Registration).await;
        assert!(matches!(res, Ok(None)));
        let res =
            check_purpose_allowed(&store, "active@example.com", OtpPurpose::Registration).await;
        assert!(matches!(res, Err(AppError::BadRequestErr(_))));
    }

    #[tokio::test]
    async fn test_other_purposes_need_active_account() {
        let store = store().await;
        let res =
            check_purpose_allowed(&store, "active@example.com", OtpPurpose::ForgotPassword).await;
        assert_eq!(res.unwrap().map(|u| u.id), Some(1));
        for email in ["inactive@example.com", "nobody@example.com"] {
            let res = check_purpose_allowed(&store, email, OtpPurpose::EmailVerification).await;
            assert!(matches!(res, Err(AppError::NotFound(_))));
        }
    }
}
