use actix_web::{HttpResponse, web};
use sea_orm::{DatabaseConnection, DbErr};

use crate::auth::authorization::require_role;
use crate::db::farms as farm_db;
use crate::error::{AppError, AppResult};
use crate::models::farms::{CreateFarmRequest, FarmStatus, UpdateFarm};
use crate::models::users::Role;

/// GET /{farmer_id} — all farms owned by a farmer.
pub async fn get_farms_by_farmer(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let farms = farm_db::get_farms_by_user_id(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": farms,
    })))
}

/// GET /farms — farms still open for agreements.
pub async fn get_available_farms(db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let farms = farm_db::get_farms_by_status(db.get_ref(), FarmStatus::Available).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": farms,
    })))
}

/// POST /add
pub async fn create_farm(
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateFarmRequest>,
) -> AppResult<HttpResponse> {
    let CreateFarmRequest { user_id, fields } = body.into_inner();
    let user_id = user_id.ok_or_else(|| AppError::validation("User ID is required."))?;
    let new_farm = fields.into_new_farm(user_id).map_err(AppError::Validation)?;

    require_role(db.get_ref(), user_id, Role::Farmer).await?;
    let farm = farm_db::insert_farm(db.get_ref(), new_farm).await?;

    tracing::info!(farm_id = %farm.farm_id, user_id, "farm added");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": true,
        "data": farm,
        "message": "Farm added successfully",
    })))
}

/// PUT /{id} — partial update by row ID.
pub async fn update_farm(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    body: web::Json<UpdateFarm>,
) -> AppResult<HttpResponse> {
    let changes = body.into_inner().checked().map_err(AppError::Validation)?;
    let farm = farm_db::update_farm(db.get_ref(), path.into_inner(), changes)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotFound(_) => AppError::not_found("Farm not found"),
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": farm,
        "message": "Farm updated successfully",
    })))
}

/// DELETE /{id}
pub async fn delete_farm(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let result = farm_db::delete_farm(db.get_ref(), path.into_inner()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Farm not found"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Farm deleted successfully",
    })))
}
