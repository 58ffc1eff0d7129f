use actix_web::{HttpResponse, web};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::auth::authorization::require_role;
use crate::db::{farms as farm_db, users as user_db};
use crate::error::{AppError, AppResult};
use crate::models::farms::{FarmFields, FarmerListing, FarmerProfile, UpdateFarmerProfile};
use crate::models::users::Role;

/// GET /get-farmers — every farm row joined with its farmer.
pub async fn get_farmers(db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let rows = farm_db::get_farmers_with_farms(db.get_ref()).await?;
    let data: Vec<FarmerListing> = rows
        .into_iter()
        .map(|(farm, owner)| FarmerListing {
            user_id: owner.id,
            full_name: owner.full_name,
            farm_id: farm.farm_id,
            location_address: farm.location_address,
            land_area: farm.land_area,
            preferred_crops: farm.preferred_crops,
            land_image_path: farm.land_image_path,
            status: farm.status,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": data,
    })))
}

/// GET /farmer/profile/{id} — the farmer with their first farm.
///
/// A farmer without any farm row is reported as missing.
pub async fn get_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let farmer = require_role(db.get_ref(), path.into_inner(), Role::Farmer).await?;
    let farm = farm_db::get_farms_by_user_id(db.get_ref(), farmer.id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Farmer not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": FarmerProfile::new(farmer, farm),
        "message": "Farmer profile retrieved successfully",
    })))
}

/// PUT /farmer/profile/{id} — name and contact, plus the descriptive fields
/// of every farm the farmer owns.
pub async fn update_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    body: web::Json<UpdateFarmerProfile>,
) -> AppResult<HttpResponse> {
    let farmer = require_role(db.get_ref(), path.into_inner(), Role::Farmer).await?;
    let input = body.into_inner();
    let farm_changes = FarmFields {
        soil_type: input.soil_type,
        preferred_crops: input.preferred_crops,
        location_address: input.location_address,
        pincode: input.pincode,
        ..Default::default()
    };

    let txn = db.begin().await?;
    user_db::update_contact(&txn, farmer.id, input.contact).await?;
    let farms_updated = farm_db::update_farms_for_user(&txn, farmer.id, farm_changes).await?;
    txn.commit().await?;

    tracing::info!(farmer_id = farmer.id, farms_updated, "farmer profile updated");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Profile updated successfully",
    })))
}

/// DELETE /farmer/profile/{id} — the farmer's farms first, then the account.
pub async fn delete_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let farmer = require_role(db.get_ref(), path.into_inner(), Role::Farmer).await?;

    let txn = db.begin().await?;
    let farms = farm_db::delete_farms_by_user_id(&txn, farmer.id).await?;
    user_db::delete_user(&txn, farmer.id).await?;
    txn.commit().await?;

    tracing::info!(farmer_id = farmer.id, farms_deleted = farms.rows_affected, "farmer deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Farmer account and related farm details deleted successfully",
    })))
}
