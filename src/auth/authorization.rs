use sea_orm::DatabaseConnection;

use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::users::{self, Role};

/// Load a user and require that they hold `role`.
///
/// A missing user and a user of the other role are both reported as
/// `NotFound("<Role> not found")`, matching how the profile routes behave.
pub async fn require_role(
    db: &DatabaseConnection,
    user_id: i32,
    role: Role,
) -> AppResult<users::Model> {
    match user_db::get_user_by_id(db, user_id).await? {
        Some(user) if user.is(role) => Ok(user),
        _ => Err(AppError::not_found(format!("{} not found", role.as_str()))),
    }
}

/// Like [`require_role`], but a user who is not a `role` is forbidden rather
/// than missing. Used where the caller claims to act as that role.
pub async fn require_acting_role(
    db: &DatabaseConnection,
    user_id: i32,
    role: Role,
) -> AppResult<users::Model> {
    match user_db::get_user_by_id(db, user_id).await? {
        Some(user) if user.is(role) => Ok(user),
        _ => Err(AppError::authorization(format!(
            "Invalid {} or unauthorized access",
            role.as_str().to_lowercase()
        ))),
    }
}
