#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, web};
use agrosync_backend::auth::password::hash_password;
use agrosync_backend::create_pool;
use agrosync_backend::db::{AgreementStore, SqlAgreementStore, farms as farm_db, users as user_db};
use agrosync_backend::handlers;
use agrosync_backend::models::agreements::NewAgreement;
use agrosync_backend::models::farms::{self, NewFarm};
use agrosync_backend::models::users::{self, NewUser, Role};
use agrosync_backend::notify::{DeliveryReceipt, Notifier, NotifyError, PhoneNumber, SmsGateway};
use agrosync_backend::services::AgreementService;
use agrosync_backend::services::agreements::SignaturePolicy;
use agrosync_backend::storage::{FileStore, LocalFileStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;

/// Gateway that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingGateway {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<DeliveryReceipt, NotifyError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));
        Ok(DeliveryReceipt {
            sid: format!("SM{}", sent.len()),
            status: Some("queued".to_string()),
        })
    }
}

/// Gateway whose provider rejects everything.
pub struct FailingGateway;

#[async_trait]
impl SmsGateway for FailingGateway {
    async fn send(&self, _to: &PhoneNumber, _body: &str) -> Result<DeliveryReceipt, NotifyError> {
        Err(NotifyError::Rejected {
            status: 401,
            detail: "Authenticate".to_string(),
        })
    }
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub gateway: Arc<RecordingGateway>,
    pub notifier: Notifier,
    pub service: AgreementService,
    pub upload_dir: PathBuf,
    pub files: web::Data<dyn FileStore>,
}

/// A freshly migrated in-memory SQLite database.
pub async fn setup_db() -> DatabaseConnection {
    let db = create_pool("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn context() -> TestContext {
    context_with(SignaturePolicy::Optional).await
}

pub async fn context_with(policy: SignaturePolicy) -> TestContext {
    let db = setup_db().await;
    let gateway = Arc::new(RecordingGateway::default());
    let notifier = Notifier::new(gateway.clone());
    let store: Arc<dyn AgreementStore> = Arc::new(SqlAgreementStore::new(db.clone()));
    let service = AgreementService::new(store, notifier.clone(), policy);

    let upload_dir = std::env::temp_dir().join(format!("agrosync-test-{}", uuid::Uuid::new_v4()));
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::open(&upload_dir).await.unwrap());

    TestContext {
        db,
        gateway,
        notifier,
        service,
        upload_dir,
        files: web::Data::from(files),
    }
}

impl TestContext {
    /// The application as `main` assembles it, minus CORS and static files.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.db.clone()))
            .app_data(web::Data::new(self.service.clone()))
            .app_data(web::Data::new(self.notifier.clone()))
            .app_data(self.files.clone())
            .configure(handlers::init_routes)
            .default_service(web::to(handlers::not_found))
    }

    pub async fn farmer(&self, user_name: &str, contact: &str) -> users::Model {
        self.user(user_name, contact, Role::Farmer).await
    }

    pub async fn contractor(&self, user_name: &str, contact: &str) -> users::Model {
        self.user(user_name, contact, Role::Contractor).await
    }

    pub async fn user(&self, user_name: &str, contact: &str, role: Role) -> users::Model {
        user_db::insert_user(
            &self.db,
            NewUser {
                full_name: format!("{user_name} full name"),
                user_name: user_name.to_string(),
                password_hash: hash_password("secret-pass").unwrap(),
                contact: contact.to_string(),
                role,
                aadhar: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn farm(&self, owner: &users::Model) -> farms::Model {
        farm_db::insert_farm(
            &self.db,
            NewFarm {
                user_id: owner.id,
                soil_type: Some("Black".to_string()),
                water_source: Some("Borewell".to_string()),
                land_area: 4.5,
                location_address: Some("Nashik".to_string()),
                pincode: Some("422001".to_string()),
                preferred_crops: Some("Grapes".to_string()),
                utara_file_path: None,
                land_image_path: None,
            },
        )
        .await
        .unwrap()
    }
}

pub fn proposal(farm: &farms::Model, farmer_id: i32, contractor_id: i32) -> NewAgreement {
    NewAgreement {
        farm_id: farm.farm_id.clone(),
        farmer_id,
        contractor_id,
        amount: 25000.0,
        terms: vec!["Irrigation by contractor".to_string(), "Harvest split 60/40".to_string()],
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
        contract_details: Some("Kharif and rabi seasons".to_string()),
        kind: None,
        profit_share: Some(40.0),
        sale_price: None,
        payment_method: Some("Bank transfer".to_string()),
        crop_type: Some("Grapes".to_string()),
        penalty_clause: None,
        renewal_option: None,
        contractor_signature: Some("data:image/png;base64,Q09OVFJBQ1RPUg==".to_string()),
    }
}
