use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use agrosync_backend::db::{AgreementStore, SqlAgreementStore};
use agrosync_backend::notify::{LogGateway, Notifier, SmsGateway, TwilioGateway};
use agrosync_backend::services::AgreementService;
use agrosync_backend::storage::{FileStore, LocalFileStore};
use agrosync_backend::{AppConfig, create_pool, handlers};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
        tracing::info!("migrations applied");
    }

    let gateway: Arc<dyn SmsGateway> = match config.twilio.clone() {
        Some(twilio) => {
            tracing::info!(from = %twilio.from_number, "sms via twilio");
            Arc::new(TwilioGateway::new(twilio))
        }
        None => {
            tracing::warn!("twilio credentials not set; sms will only be logged");
            Arc::new(LogGateway)
        }
    };
    let notifier = Notifier::new(gateway);

    let store: Arc<dyn AgreementStore> = Arc::new(SqlAgreementStore::new(db.clone()));
    let agreements = web::Data::new(AgreementService::new(
        store,
        notifier.clone(),
        config.signature_policy(),
    ));

    let uploads = LocalFileStore::open(&config.upload_dir)
        .await
        .map_err(std::io::Error::other)?;
    let upload_dir = uploads.root().to_path_buf();
    let file_store: Arc<dyn FileStore> = Arc::new(uploads);
    let file_store: web::Data<dyn FileStore> = web::Data::from(file_store);

    let db_data = web::Data::new(db);
    let notifier_data = web::Data::new(notifier);
    let cors_origins = config.cors_origins.clone();

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(agreements.clone())
            .app_data(notifier_data.clone())
            .app_data(file_store.clone())
            .service(Files::new("/uploads", upload_dir.clone()))
            .configure(handlers::init_routes)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
