pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_farm_details_table;
mod m20250301_000003_create_agreements_table;
mod m20250302_000001_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_farm_details_table::Migration),
            Box::new(m20250301_000003_create_agreements_table::Migration),
            Box::new(m20250302_000001_add_indexes::Migration),
        ]
    }
}
