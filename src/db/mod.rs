pub mod agreements;
pub mod farms;
pub mod store;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub use store::{AgreementStore, SqlAgreementStore};

/// Open a SeaORM connection pool. The dialect (PostgreSQL, MySQL, SQLite)
/// follows the URL scheme.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(16)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    // Every pooled SQLite connection to `:memory:` would be its own database.
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    Database::connect(options).await
}
