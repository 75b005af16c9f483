//! SeaORM-based database access
//!
//! This module provides connection bootstrap and the SeaORM implementation of
//! the model store used by repositories. Supported backends:
//! - SQLite
//! - PostgreSQL
//! - MySQL

use sea_orm::{ConnectOptions, Database, DatabaseBackend, DatabaseConnection, DbErr};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub mod sea_orm_store;

pub use sea_orm_store::SeaOrmStore;

/// Backend implied by a connection URL
pub fn detect_backend(url: &str) -> Result<DatabaseBackend, DbErr> {
    if url.starts_with("sqlite:") {
        Ok(DatabaseBackend::Sqlite)
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(DatabaseBackend::Postgres)
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Ok(DatabaseBackend::MySql)
    } else {
        Err(DbErr::Custom(format!("Unsupported database URL: {url}")))
    }
}

/// Open a shared connection pool for `url`
pub async fn connect(url: &str, max_connections: Option<u32>) -> Result<Arc<DatabaseConnection>, DbErr> {
    let backend = detect_backend(url)?;
    info!("Connecting to {:?} database", backend);

    let mut connect_options = ConnectOptions::new(url);
    connect_options
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    // In-memory SQLite lives per connection, so a pool must not fan out.
    if url.contains(":memory:") {
        connect_options.max_connections(1).min_connections(1);
    } else if let Some(max) = max_connections {
        connect_options.max_connections(max);
    }

    let connection = match Database::connect(connect_options).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Database connection failed: {:?}", e);
            let mut source = e.source();
            let mut level = 0;
            while let Some(err) = source {
                error!("  Level {}: {}", level, err);
                source = err.source();
                level += 1;
            }
            return Err(e);
        }
    };

    debug!("Database connection established successfully");
    Ok(Arc::new(connection))
}
