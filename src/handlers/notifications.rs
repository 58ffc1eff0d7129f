use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::authorization::{require_acting_role, require_role};
use crate::error::{AppError, AppResult};
use crate::models::notifications::{FarmerMessageRequest, SendSmsRequest};
use crate::models::users::Role;
use crate::notify::{Notifier, NotifyError};

/// POST /send-sms — send an arbitrary message to a number.
pub async fn send_sms(
    notifier: web::Data<Notifier>,
    body: web::Json<SendSmsRequest>,
) -> AppResult<HttpResponse> {
    let SendSmsRequest { to, message } = body.into_inner();
    let (Some(to), Some(message)) = (to, message) else {
        return Err(AppError::validation("Phone number and message are required"));
    };

    match notifier.notify(&to, &message).await {
        Ok(receipt) => Ok(sent(&receipt.sid)),
        Err(e) => delivery_failure(e, "Failed to send message"),
    }
}

/// POST /send-farmer-message — a contractor contacts a farmer by SMS.
pub async fn send_farmer_message(
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    body: web::Json<FarmerMessageRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner().validate().map_err(AppError::Validation)?;

    require_acting_role(db.get_ref(), request.contractor_id, Role::Contractor).await?;
    let farmer = require_role(db.get_ref(), request.farmer_id, Role::Farmer).await?;

    match notifier.notify(&farmer.contact, &request.sms_body()).await {
        Ok(receipt) => {
            tracing::info!(
                farmer_id = farmer.id,
                contractor_id = request.contractor_id,
                sid = %receipt.sid,
                "farmer message sent"
            );
            Ok(sent(&receipt.sid))
        }
        Err(e) => delivery_failure(
            e,
            "Failed to send message. Please check the phone number format.",
        ),
    }
}

fn sent(sid: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": { "sid": sid },
        "message": "Message sent successfully",
    }))
}

/// A malformed number is the caller's fault; anything else is a 500 that
/// still carries the endpoint's own message.
fn delivery_failure(err: NotifyError, message: &str) -> AppResult<HttpResponse> {
    match err {
        NotifyError::InvalidNumber(number) => {
            tracing::info!(%number, "sms rejected: invalid phone number");
            Err(AppError::validation("Invalid phone number."))
        }
        other => {
            tracing::error!(error = %other, "sms delivery failed");
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "status": false,
                "message": message,
            })))
        }
    }
}
