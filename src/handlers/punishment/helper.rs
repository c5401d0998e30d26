use crate::{
    models::User,
    store::{Store, UserStore},
    utils::AppError,
};

pub async fn find_target(store: &dyn Store, user_id: u32) -> Result<User, AppError> {
    store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound(format!("User not found with id: {user_id}")))
}
