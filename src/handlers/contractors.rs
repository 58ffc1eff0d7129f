use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::authorization::require_role;
use crate::db::users as user_db;
use crate::error::AppResult;
use crate::models::users::{ContractorSummary, Role, UpdateContact, UserResponse};

/// GET /contractor/profile/{id}
pub async fn get_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let contractor = require_role(db.get_ref(), path.into_inner(), Role::Contractor).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": UserResponse::from(contractor),
    })))
}

/// PUT /contractor/profile/{id} — name and contact only.
pub async fn update_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    body: web::Json<UpdateContact>,
) -> AppResult<HttpResponse> {
    let contractor = require_role(db.get_ref(), path.into_inner(), Role::Contractor).await?;
    let updated = user_db::update_contact(db.get_ref(), contractor.id, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": UserResponse::from(updated),
        "message": "Contractor profile updated successfully",
    })))
}

/// DELETE /contractor/profile/{id}
pub async fn delete_profile(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let contractor = require_role(db.get_ref(), path.into_inner(), Role::Contractor).await?;
    user_db::delete_user(db.get_ref(), contractor.id).await?;

    tracing::info!(contractor_id = contractor.id, "contractor deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Contractor account deleted successfully",
    })))
}

/// GET /api/contractors
pub async fn list_contractors(db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let contractors: Vec<ContractorSummary> = user_db::get_users_by_role(db.get_ref(), Role::Contractor)
        .await?
        .into_iter()
        .map(ContractorSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": contractors,
    })))
}
