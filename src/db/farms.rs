use sea_orm::*;

use crate::models::farms::{self, FarmStatus, NewFarm, UpdateFarm, new_farm_token};
use crate::models::users::{self, Role};

/// Insert a new farm with a fresh token, `available`.
pub async fn insert_farm<C: ConnectionTrait>(db: &C, input: NewFarm) -> Result<farms::Model, DbErr> {
    let new_farm = farms::ActiveModel {
        id: NotSet,
        farm_id: Set(new_farm_token()),
        user_id: Set(input.user_id),
        soil_type: Set(input.soil_type),
        water_source: Set(input.water_source),
        land_area: Set(input.land_area),
        location_address: Set(input.location_address),
        pincode: Set(input.pincode),
        preferred_crops: Set(input.preferred_crops),
        utara_file_path: Set(input.utara_file_path),
        land_image_path: Set(input.land_image_path),
        status: Set(FarmStatus::Available),
        created_at: Set(chrono::Utc::now()),
    };

    new_farm.insert(db).await
}

/// Fetch all farms owned by one user, oldest first.
pub async fn get_farms_by_user_id(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<farms::Model>, DbErr> {
    farms::Entity::find()
        .filter(farms::Column::UserId.eq(user_id))
        .order_by_asc(farms::Column::Id)
        .all(db)
        .await
}

/// Fetch a farm by its token.
pub async fn get_farm_by_token(
    db: &DatabaseConnection,
    farm_id: &str,
) -> Result<Option<farms::Model>, DbErr> {
    farms::Entity::find()
        .filter(farms::Column::FarmId.eq(farm_id))
        .one(db)
        .await
}

/// Fetch every farm whose owner is a Farmer, paired with the owner.
pub async fn get_farmers_with_farms(
    db: &DatabaseConnection,
) -> Result<Vec<(farms::Model, users::Model)>, DbErr> {
    let rows = farms::Entity::find()
        .find_also_related(users::Entity)
        .filter(users::Column::UserType.eq(Role::Farmer))
        .order_by_asc(farms::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(farm, owner)| owner.map(|owner| (farm, owner)))
        .collect())
}

/// Fetch all farms in one availability state.
pub async fn get_farms_by_status(
    db: &DatabaseConnection,
    status: FarmStatus,
) -> Result<Vec<farms::Model>, DbErr> {
    farms::Entity::find()
        .filter(farms::Column::Status.eq(status))
        .order_by_desc(farms::Column::CreatedAt)
        .all(db)
        .await
}

/// Update an existing farm by row ID.
pub async fn update_farm(
    db: &DatabaseConnection,
    id: i32,
    input: UpdateFarm,
) -> Result<farms::Model, DbErr> {
    let farm = farms::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Farm not found".to_string()))?;

    let mut active: farms::ActiveModel = farm.into();

    if let Some(soil_type) = input.soil_type {
        active.soil_type = Set(Some(soil_type));
    }
    if let Some(water_source) = input.water_source {
        active.water_source = Set(Some(water_source));
    }
    if let Some(land_area) = input.land_area {
        active.land_area = Set(land_area);
    }
    if let Some(location_address) = input.location_address {
        active.location_address = Set(Some(location_address));
    }
    if let Some(pincode) = input.pincode {
        active.pincode = Set(Some(pincode));
    }
    if let Some(preferred_crops) = input.preferred_crops {
        active.preferred_crops = Set(Some(preferred_crops));
    }

    active.update(db).await
}

/// Apply the farm half of a farmer profile edit to all of the farmer's farms.
pub async fn update_farms_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    input: UpdateFarm,
) -> Result<u64, DbErr> {
    let mut changes = farms::ActiveModel {
        ..Default::default()
    };
    if let Some(soil_type) = input.soil_type {
        changes.soil_type = Set(Some(soil_type));
    }
    if let Some(preferred_crops) = input.preferred_crops {
        changes.preferred_crops = Set(Some(preferred_crops));
    }
    if let Some(location_address) = input.location_address {
        changes.location_address = Set(Some(location_address));
    }
    if let Some(pincode) = input.pincode {
        changes.pincode = Set(Some(pincode));
    }
    if !changes.is_changed() {
        return Ok(0);
    }

    let result = farms::Entity::update_many()
        .set(changes)
        .filter(farms::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Set the availability of the farm with the given token.
pub async fn set_farm_status(
    db: &DatabaseConnection,
    farm_id: &str,
    status: FarmStatus,
) -> Result<u64, DbErr> {
    let changes = farms::ActiveModel {
        status: Set(status),
        ..Default::default()
    };

    let result = farms::Entity::update_many()
        .set(changes)
        .filter(farms::Column::FarmId.eq(farm_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a farm by row ID.
pub async fn delete_farm(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    farms::Entity::delete_by_id(id).exec(db).await
}

/// Delete every farm owned by a user.
pub async fn delete_farms_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<DeleteResult, DbErr> {
    farms::Entity::delete_many()
        .filter(farms::Column::UserId.eq(user_id))
        .exec(db)
        .await
}
