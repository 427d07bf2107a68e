pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod report;

use config::AppConfig;
use error::AppError;
use infra::{init_db, DbPool};

/// Open (creating and migrating as needed) the database named by `config`.
pub fn open(config: &AppConfig) -> Result<DbPool, AppError> {
    let db_path = config.db_path();
    log::info!("DB path: {:?}", db_path);

    init_db(&db_path).map_err(|e| {
        log::error!("DB init failed: {}", e);
        e
    })
}
