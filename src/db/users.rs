use sea_orm::*;

use crate::models::users::{self, NewUser, Role, UpdateContact};

/// Insert a new user. Generic over the connection so registration can run
/// it inside a transaction.
pub async fn insert_user<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<users::Model, DbErr> {
    let new_user = users::ActiveModel {
        id: NotSet,
        full_name: Set(input.full_name),
        user_name: Set(input.user_name),
        password: Set(input.password_hash),
        contact: Set(input.contact),
        user_type: Set(input.role),
        aadhar: Set(input.aadhar),
        created_at: Set(chrono::Utc::now()),
    };

    new_user.insert(db).await
}

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Fetch a user by login handle.
pub async fn get_user_by_user_name(
    db: &DatabaseConnection,
    user_name: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::UserName.eq(user_name))
        .one(db)
        .await
}

/// Fetch every user whose ID is in `ids`.
pub async fn get_users_by_ids(
    db: &DatabaseConnection,
    ids: &[i32],
) -> Result<Vec<users::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    users::Entity::find()
        .filter(users::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await
}

/// Fetch all users of one role.
pub async fn get_users_by_role(
    db: &DatabaseConnection,
    role: Role,
) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::UserType.eq(role))
        .order_by_asc(users::Column::Id)
        .all(db)
        .await
}

/// Update a user's display name and contact number.
pub async fn update_contact<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: UpdateContact,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(full_name) = input.full_name {
        active.full_name = Set(full_name);
    }
    if let Some(contact) = input.contact {
        active.contact = Set(contact);
    }

    active.update(db).await
}

/// Delete a user by ID.
pub async fn delete_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<DeleteResult, DbErr> {
    users::Entity::delete_by_id(id).exec(db).await
}
