use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use sea_orm::{DatabaseConnection, DbErr, SqlErr, TransactionTrait};

use crate::auth::password::{hash_password, verify_password};
use crate::db::{farms as farm_db, users as user_db};
use crate::error::{AppError, AppResult};
use crate::models::users::{
    ForgotPasswordRequest, LoginRequest, NewUser, RegisterForm, Role, UserResponse,
};
use crate::storage::{FileStore, upload_name};

const UPLOAD_FIELDS: [&str; 2] = ["utara", "landImage"];
const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

struct Upload {
    field: String,
    stored_name: String,
    bytes: Vec<u8>,
}

/// POST /register — multipart form. Farmers also get their farm row, with
/// the names of the uploaded `utara` and `landImage` files.
pub async fn register(
    db: web::Data<DatabaseConnection>,
    files: web::Data<dyn FileStore>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (form, uploads) = read_register_form(payload).await?;
    let (role, user_name, password) = form.account().map_err(AppError::Validation)?;

    if user_db::get_user_by_user_name(db.get_ref(), user_name).await?.is_some() {
        return Err(AppError::validation("Username already exists."));
    }

    let new_farm = match role {
        Role::Farmer => Some(
            form.farm
                .clone()
                .into_new_farm(0)
                .map_err(AppError::Validation)?,
        ),
        Role::Contractor => None,
    };

    let plain = password.to_string();
    let password_hash = web::block(move || hash_password(&plain))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))??;

    let new_user = NewUser {
        full_name: form.full_name.clone().unwrap_or_default(),
        user_name: user_name.to_string(),
        password_hash,
        contact: form.contact.clone().unwrap_or_default(),
        role,
        aadhar: form.aadhar.clone(),
    };

    let txn = db.begin().await?;
    let user = user_db::insert_user(&txn, new_user).await.map_err(duplicate_user)?;

    if let Some(mut farm) = new_farm {
        farm.user_id = user.id;
        for upload in &uploads {
            match upload.field.as_str() {
                "utara" => farm.utara_file_path = Some(upload.stored_name.clone()),
                "landImage" => farm.land_image_path = Some(upload.stored_name.clone()),
                _ => {}
            }
        }
        farm_db::insert_farm(&txn, farm).await?;
        store_uploads(files.get_ref(), &uploads).await?;
    }

    // Uploads are only written for farmers.
    if let Err(e) = txn.commit().await {
        if role == Role::Farmer {
            discard_uploads(files.get_ref(), &uploads).await;
        }
        return Err(e.into());
    }
    tracing::info!(user_id = user.id, role = role.as_str(), "user registered");

    let message = match role {
        Role::Farmer => "Farmer registered successfully!",
        Role::Contractor => "User registered successfully!",
    };
    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": true,
        "message": message,
        "userId": user.id,
    })))
}

/// POST /login
pub async fn login(
    db: web::Data<DatabaseConnection>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let LoginRequest { user_name, password } = body.into_inner();
    let (Some(user_name), Some(password)) = (user_name, password) else {
        return Err(AppError::validation("Please provide username and password."));
    };

    let invalid = || AppError::Unauthenticated("Invalid username or password.".to_string());

    let user = user_db::get_user_by_user_name(db.get_ref(), user_name.trim())
        .await?
        .ok_or_else(invalid)?;

    let stored = user.password.clone();
    let matches = web::block(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::internal(format!("Password check task failed: {e}")))?;
    if !matches {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(invalid());
    }

    let is_farmer = user.is(Role::Farmer);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Login successful!",
        "userType": user.user_type,
        "farmerId": is_farmer.then_some(user.id),
        "contractorId": (!is_farmer).then_some(user.id),
        "user": UserResponse::from(user),
    })))
}

/// POST /forgot-password — looks the account up; no mail is sent.
pub async fn forgot_password(
    db: web::Data<DatabaseConnection>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    let email = body
        .into_inner()
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::validation("Email is required"))?;

    // Usernames double as email addresses.
    user_db::get_user_by_user_name(db.get_ref(), email.trim())
        .await?
        .ok_or_else(|| AppError::not_found("Email not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "message": "Reset link sent to your email (simulated)",
    })))
}

/// Drain the multipart stream into the text form and the accepted uploads.
async fn read_register_form(mut payload: Multipart) -> AppResult<(RegisterForm, Vec<Upload>)> {
    let mut text = serde_json::Map::new();
    let mut uploads = Vec::new();
    let now = chrono::Utc::now().timestamp_millis();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::validation(format!("Invalid form data: {e}")))?;

        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        let Some(name) = disposition.get_name().map(str::to_string) else {
            continue;
        };
        let filename = disposition.get_filename().map(str::to_string);

        let limit = if filename.is_some() { MAX_FILE_BYTES } else { MAX_TEXT_BYTES };
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::validation(format!("Invalid form data: {e}")))?;
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::validation(format!("Field {name} is too large.")));
            }
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(original) if UPLOAD_FIELDS.contains(&name.as_str()) => {
                if bytes.is_empty() || uploads.iter().any(|u: &Upload| u.field == name) {
                    continue;
                }
                uploads.push(Upload {
                    stored_name: upload_name(&name, Some(&original), now),
                    field: name,
                    bytes,
                });
            }
            Some(_) => {
                tracing::debug!(field = %name, "ignoring unexpected upload");
            }
            None => {
                let value = String::from_utf8(bytes)
                    .map_err(|_| AppError::validation(format!("Field {name} is not valid UTF-8.")))?;
                text.insert(name, serde_json::Value::String(value));
            }
        }
    }

    let form = serde_json::from_value(serde_json::Value::Object(text))
        .map_err(|e| AppError::validation(format!("Invalid form data: {e}")))?;
    Ok((form, uploads))
}

/// Write every upload. If one fails, the ones already written are removed.
async fn store_uploads(files: &dyn FileStore, uploads: &[Upload]) -> AppResult<()> {
    for (written, upload) in uploads.iter().enumerate() {
        if let Err(e) = files.save(&upload.stored_name, &upload.bytes).await {
            discard_uploads(files, &uploads[..written]).await;
            return Err(AppError::internal(format!("Failed to store {}: {e}", upload.field)));
        }
    }
    Ok(())
}

async fn discard_uploads(files: &dyn FileStore, uploads: &[Upload]) {
    for upload in uploads {
        if let Err(e) = files.remove(&upload.stored_name).await {
            tracing::warn!(file = %upload.stored_name, error = %e, "failed to remove orphaned upload");
        }
    }
}

fn duplicate_user(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::validation("Username already exists."),
        _ => AppError::Database(err),
    }
}
