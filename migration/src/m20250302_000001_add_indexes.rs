use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Agreements {
    Table,
    FarmerId,
    ContractorId,
    FarmId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FarmDetails {
    Table,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing agreements for a user filters on either party.
        manager
            .create_index(
                Index::create()
                    .name("idx_agreements_farmer_id")
                    .table(Agreements::Table)
                    .col(Agreements::FarmerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agreements_contractor_id")
                    .table(Agreements::Table)
                    .col(Agreements::ContractorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agreements_farm_id")
                    .table(Agreements::Table)
                    .col(Agreements::FarmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agreements_created_at")
                    .table(Agreements::Table)
                    .col(Agreements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Farmer profile and farm listing look farms up by owner.
        manager
            .create_index(
                Index::create()
                    .name("idx_farm_details_user_id")
                    .table(FarmDetails::Table)
                    .col(FarmDetails::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_farm_details_user_id")
                    .table(FarmDetails::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_agreements_created_at")
                    .table(Agreements::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_agreements_farm_id")
                    .table(Agreements::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_agreements_contractor_id")
                    .table(Agreements::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_agreements_farmer_id")
                    .table(Agreements::Table)
                    .to_owned(),
            )
            .await
    }
}
