pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use util::config;

/// Opens the configured database.
///
/// Bare paths are treated as SQLite files and created on first use; anything
/// that already looks like a DSN is passed through untouched.
pub async fn connect() -> DatabaseConnection {
    let url = database_url(config::database_path());
    Database::connect(&url)
        .await
        .expect("Failed to connect to database")
}

fn database_url(configured: String) -> String {
    if configured.starts_with("sqlite:") || configured.contains("://") {
        return configured;
    }
    // SQLite will not create intermediate directories on its own.
    if let Some(parent) = Path::new(&configured).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    format!("sqlite://{configured}?mode=rwc")
}
