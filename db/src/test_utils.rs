//! Database helpers for tests.

use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory SQLite database with the full schema applied.
///
/// Every call returns an isolated database, so tests never share state and
/// need no serialization between them.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should always connect");

    Migrator::up(&db, None)
        .await
        .expect("migrations should apply cleanly");

    db
}
