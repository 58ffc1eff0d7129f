pub mod agreements;
pub mod auth;
pub mod contractors;
pub mod farmers;
pub mod farms;
pub mod notifications;

use actix_web::{HttpRequest, HttpResponse, error, web};

use crate::error::AppError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and paths get the same `{status:false}` shape as
    // every other failure.
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error));

    // ── Accounts ──
    cfg.route("/register", web::post().to(auth::register))
        .route("/login", web::post().to(auth::login))
        .route("/forgot-password", web::post().to(auth::forgot_password));

    // ── Profiles ──
    cfg.route("/get-farmers", web::get().to(farmers::get_farmers));
    cfg.service(
        web::resource("/farmer/profile/{id}")
            .route(web::get().to(farmers::get_profile))
            .route(web::put().to(farmers::update_profile))
            .route(web::delete().to(farmers::delete_profile)),
    );
    cfg.service(
        web::resource("/contractor/profile/{id}")
            .route(web::get().to(contractors::get_profile))
            .route(web::put().to(contractors::update_profile))
            .route(web::delete().to(contractors::delete_profile)),
    );
    cfg.route("/api/contractors", web::get().to(contractors::list_contractors));

    // ── Notifications ──
    cfg.route("/send-sms", web::post().to(notifications::send_sms))
        .route("/send-farmer-message", web::post().to(notifications::send_farmer_message));

    // ── Agreements ──
    cfg.service(
        web::scope("/agreements")
            .route("", web::post().to(agreements::propose))
            .route("/active-farms", web::get().to(agreements::active_farms))
            .route("/user/{user_id}", web::get().to(agreements::list_for_user))
            .route("/{id}/status", web::put().to(agreements::decide))
            .route("/{id}", web::delete().to(agreements::delete)),
    );

    // ── Farms ──
    // The bare numeric routes are registered last so they never shadow the
    // named paths above.
    cfg.route("/farms", web::get().to(farms::get_available_farms))
        .route("/add", web::post().to(farms::create_farm))
        .service(
            web::resource(r"/{id:\d+}")
                .route(web::get().to(farms::get_farms_by_farmer))
                .route(web::put().to(farms::update_farm))
                .route(web::delete().to(farms::delete_farm)),
        );
}

/// Fallback for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "status": false,
        "message": "Route not found.",
    }))
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    AppError::validation(format!("Invalid JSON body: {err}")).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> error::Error {
    AppError::validation(format!("Invalid path parameter: {err}")).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    AppError::validation(format!("Invalid query string: {err}")).into()
}
