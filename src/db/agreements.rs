use sea_orm::prelude::DateTimeUtc;
use sea_orm::*;

use crate::models::agreements::{self, AgreementStatus, NewAgreement};

/// Insert a new agreement (always Pending).
pub async fn insert_agreement(
    db: &DatabaseConnection,
    input: NewAgreement,
) -> Result<agreements::Model, DbErr> {
    let terms = serde_json::to_string(&input.terms)
        .map_err(|e| DbErr::Custom(format!("Failed to encode terms: {e}")))?;
    let now = chrono::Utc::now();

    let new_agreement = agreements::ActiveModel {
        id: NotSet,
        farm_id: Set(input.farm_id),
        farmer_id: Set(input.farmer_id),
        contractor_id: Set(input.contractor_id),
        status: Set(AgreementStatus::Pending),
        amount: Set(input.amount),
        contract_details: Set(input.contract_details),
        terms: Set(terms),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        agreement_type: Set(input.kind),
        profit_share: Set(input.profit_share),
        sale_price: Set(input.sale_price),
        payment_method: Set(input.payment_method),
        crop_type: Set(input.crop_type),
        penalty_clause: Set(input.penalty_clause),
        renewal_option: Set(input.renewal_option),
        contractor_signature: Set(input.contractor_signature),
        farmer_signature: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_agreement.insert(db).await
}

/// Fetch a single agreement by ID.
pub async fn get_agreement_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<agreements::Model>, DbErr> {
    agreements::Entity::find_by_id(id).one(db).await
}

/// Fetch agreements where the user is either party, newest first.
/// `page` is `(page, limit)` with `page` starting at 1.
pub async fn get_agreements_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    page: Option<(u64, u64)>,
) -> Result<Vec<agreements::Model>, DbErr> {
    let mut query = agreements::Entity::find()
        .filter(
            Condition::any()
                .add(agreements::Column::FarmerId.eq(user_id))
                .add(agreements::Column::ContractorId.eq(user_id)),
        )
        .order_by_desc(agreements::Column::CreatedAt)
        .order_by_desc(agreements::Column::Id);

    if let Some((page, limit)) = page {
        query = query.offset((page - 1) * limit).limit(limit);
    }

    query.all(db).await
}

/// Move a Pending agreement to `status` in a single conditional UPDATE.
///
/// Returns `false` when no Pending row with this ID exists, which is how a
/// losing concurrent decision is detected. `farmer_signature` is written
/// only when given.
pub async fn resolve_pending(
    db: &DatabaseConnection,
    id: i32,
    status: AgreementStatus,
    farmer_signature: Option<String>,
    at: DateTimeUtc,
) -> Result<bool, DbErr> {
    let mut changes = agreements::ActiveModel {
        status: Set(status),
        updated_at: Set(at),
        ..Default::default()
    };
    if let Some(signature) = farmer_signature {
        changes.farmer_signature = Set(Some(signature));
    }

    let result = agreements::Entity::update_many()
        .set(changes)
        .filter(agreements::Column::Id.eq(id))
        .filter(agreements::Column::Status.eq(AgreementStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Delete an agreement by ID.
pub async fn delete_agreement(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    agreements::Entity::delete_by_id(id).exec(db).await
}

/// Distinct farm tokens that have an accepted agreement.
pub async fn get_active_farm_ids(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    agreements::Entity::find()
        .select_only()
        .column(agreements::Column::FarmId)
        .filter(agreements::Column::Status.eq(AgreementStatus::Accepted))
        .distinct()
        .order_by_asc(agreements::Column::FarmId)
        .into_tuple::<String>()
        .all(db)
        .await
}
