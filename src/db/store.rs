use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, prelude::DateTimeUtc};

use crate::db::{agreements as agreement_db, farms as farm_db, users as user_db};
use crate::models::agreements::{self, AgreementStatus, NewAgreement};
use crate::models::farms::FarmStatus;
use crate::models::users;

/// Persistence port of the agreement service.
///
/// The service holds one of these and never touches a connection directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgreementStore: Send + Sync {
    async fn find_user(&self, id: i32) -> Result<Option<users::Model>, DbErr>;

    async fn find_users(&self, ids: &[i32]) -> Result<Vec<users::Model>, DbErr>;

    async fn insert_agreement(&self, input: NewAgreement) -> Result<agreements::Model, DbErr>;

    async fn find_agreement(&self, id: i32) -> Result<Option<agreements::Model>, DbErr>;

    async fn agreements_for_user(
        &self,
        user_id: i32,
        page: Option<(u64, u64)>,
    ) -> Result<Vec<agreements::Model>, DbErr>;

    /// Compare-and-swap from Pending. `Ok(false)` means the row was not Pending.
    async fn resolve_pending(
        &self,
        id: i32,
        status: AgreementStatus,
        farmer_signature: Option<String>,
        at: DateTimeUtc,
    ) -> Result<bool, DbErr>;

    /// Returns the number of farms updated.
    async fn mark_farm_in_use(&self, farm_id: &str) -> Result<u64, DbErr>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_agreement(&self, id: i32) -> Result<bool, DbErr>;

    async fn active_farm_ids(&self) -> Result<Vec<String>, DbErr>;
}

/// [`AgreementStore`] over a SeaORM connection, for any dialect SeaORM speaks.
#[derive(Clone)]
pub struct SqlAgreementStore {
    db: DatabaseConnection,
}

impl SqlAgreementStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AgreementStore for SqlAgreementStore {
    async fn find_user(&self, id: i32) -> Result<Option<users::Model>, DbErr> {
        user_db::get_user_by_id(&self.db, id).await
    }

    async fn find_users(&self, ids: &[i32]) -> Result<Vec<users::Model>, DbErr> {
        user_db::get_users_by_ids(&self.db, ids).await
    }

    async fn insert_agreement(&self, input: NewAgreement) -> Result<agreements::Model, DbErr> {
        agreement_db::insert_agreement(&self.db, input).await
    }

    async fn find_agreement(&self, id: i32) -> Result<Option<agreements::Model>, DbErr> {
        agreement_db::get_agreement_by_id(&self.db, id).await
    }

    async fn agreements_for_user(
        &self,
        user_id: i32,
        page: Option<(u64, u64)>,
    ) -> Result<Vec<agreements::Model>, DbErr> {
        agreement_db::get_agreements_for_user(&self.db, user_id, page).await
    }

    async fn resolve_pending(
        &self,
        id: i32,
        status: AgreementStatus,
        farmer_signature: Option<String>,
        at: DateTimeUtc,
    ) -> Result<bool, DbErr> {
        agreement_db::resolve_pending(&self.db, id, status, farmer_signature, at).await
    }

    async fn mark_farm_in_use(&self, farm_id: &str) -> Result<u64, DbErr> {
        farm_db::set_farm_status(&self.db, farm_id, FarmStatus::InUse).await
    }

    async fn delete_agreement(&self, id: i32) -> Result<bool, DbErr> {
        let result = agreement_db::delete_agreement(&self.db, id).await?;
        Ok(result.rows_affected > 0)
    }

    async fn active_farm_ids(&self) -> Result<Vec<String>, DbErr> {
        agreement_db::get_active_farm_ids(&self.db).await
    }
}
