use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `farm_details` table and its columns.
///
/// `user_id` is checked against `users` in application code; there is no
/// foreign key so a farmer's rows can be removed in either order.
#[derive(DeriveIden)]
enum FarmDetails {
    Table,
    Id,
    FarmId,
    UserId,
    SoilType,
    WaterSource,
    LandArea,
    LocationAddress,
    Pincode,
    PreferredCrops,
    UtaraFilePath,
    LandImagePath,
    Status,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FarmDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FarmDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FarmDetails::FarmId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FarmDetails::UserId).integer().not_null())
                    .col(ColumnDef::new(FarmDetails::SoilType).string().null())
                    .col(ColumnDef::new(FarmDetails::WaterSource).string().null())
                    .col(ColumnDef::new(FarmDetails::LandArea).double().not_null())
                    .col(ColumnDef::new(FarmDetails::LocationAddress).text().null())
                    .col(ColumnDef::new(FarmDetails::Pincode).string().null())
                    .col(ColumnDef::new(FarmDetails::PreferredCrops).text().null())
                    .col(ColumnDef::new(FarmDetails::UtaraFilePath).string().null())
                    .col(ColumnDef::new(FarmDetails::LandImagePath).string().null())
                    .col(
                        ColumnDef::new(FarmDetails::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(FarmDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FarmDetails::Table).to_owned())
            .await
    }
}
