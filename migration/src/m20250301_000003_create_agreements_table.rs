use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `agreements` table and its columns.
#[derive(DeriveIden)]
enum Agreements {
    Table,
    Id,
    FarmId,
    FarmerId,
    ContractorId,
    Status,
    Amount,
    ContractDetails,
    Terms,
    StartDate,
    EndDate,
    AgreementType,
    ProfitShare,
    SalePrice,
    PaymentMethod,
    CropType,
    PenaltyClause,
    RenewalOption,
    ContractorSignature,
    FarmerSignature,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Agreements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Agreements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Agreements::FarmId).string_len(20).not_null())
                    .col(ColumnDef::new(Agreements::FarmerId).integer().not_null())
                    .col(ColumnDef::new(Agreements::ContractorId).integer().not_null())
                    .col(
                        ColumnDef::new(Agreements::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Agreements::Amount).double().not_null())
                    .col(ColumnDef::new(Agreements::ContractDetails).text().null())
                    // JSON-encoded list of term strings.
                    .col(ColumnDef::new(Agreements::Terms).text().not_null())
                    .col(ColumnDef::new(Agreements::StartDate).date().not_null())
                    .col(ColumnDef::new(Agreements::EndDate).date().not_null())
                    .col(ColumnDef::new(Agreements::AgreementType).string().null())
                    .col(ColumnDef::new(Agreements::ProfitShare).double().null())
                    .col(ColumnDef::new(Agreements::SalePrice).double().null())
                    .col(ColumnDef::new(Agreements::PaymentMethod).string().null())
                    .col(ColumnDef::new(Agreements::CropType).string().null())
                    .col(ColumnDef::new(Agreements::PenaltyClause).text().null())
                    .col(ColumnDef::new(Agreements::RenewalOption).string().null())
                    .col(ColumnDef::new(Agreements::ContractorSignature).text().null())
                    .col(ColumnDef::new(Agreements::FarmerSignature).text().null())
                    .col(
                        ColumnDef::new(Agreements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Agreements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Agreements::Table).to_owned())
            .await
    }
}
