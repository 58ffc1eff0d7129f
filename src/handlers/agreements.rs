use actix_web::{HttpResponse, web};

use crate::error::{AppError, AppResult};
use crate::models::PaginationQuery;
use crate::models::agreements::{AgreementStatus, DecideRequest, ProposeAgreementRequest};
use crate::services::AgreementService;

/// POST /agreements — a contractor proposes an agreement on a farmer's farm.
pub async fn propose(
    service: web::Data<AgreementService>,
    body: web::Json<ProposeAgreementRequest>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner().validate().map_err(AppError::Validation)?;
    let agreement = service.propose(input).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": true,
        "agreementId": agreement.id,
        "message": "Agreement proposed successfully.",
    })))
}

/// GET /agreements/user/{user_id} — every agreement the user is a party to.
///
/// Unpaginated unless `page` or `limit` is given.
pub async fn list_for_user(
    service: web::Data<AgreementService>,
    path: web::Path<i32>,
    query: web::Query<PaginationQuery>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let page = query.requested().map_err(AppError::Validation)?;
    let rows = service.list_for_user(user_id, page).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": rows,
        "message": "Agreements fetched successfully.",
    })))
}

/// PUT /agreements/{id}/status — the farmer accepts or rejects.
pub async fn decide(
    service: web::Data<AgreementService>,
    path: web::Path<i32>,
    body: web::Json<DecideRequest>,
) -> AppResult<HttpResponse> {
    let agreement_id = path.into_inner();
    let decision = body.into_inner().validate().map_err(AppError::Validation)?;
    let outcome = service.decide(agreement_id, decision).await?;

    let verb = match outcome.new_status {
        AgreementStatus::Accepted => "accepted",
        _ => "rejected",
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "agreementId": outcome.agreement_id,
        "newStatus": outcome.new_status,
        "message": format!("Agreement {verb} successfully."),
    })))
}

/// DELETE /agreements/{id}
pub async fn delete(
    service: web::Data<AgreementService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    service.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Agreement deleted successfully.",
    })))
}

/// GET /agreements/active-farms — farm tokens under an accepted agreement.
pub async fn active_farms(service: web::Data<AgreementService>) -> AppResult<HttpResponse> {
    let farm_ids = service.active_farm_ids().await?;
    let data: Vec<_> = farm_ids
        .into_iter()
        .map(|farm_id| serde_json::json!({ "farmId": farm_id }))
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": data,
    })))
}
