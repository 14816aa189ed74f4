// ABOUTME: SQLite database manager owning the connection pool and the schema
// ABOUTME: Domain queries live in users.rs and training.rs as impl blocks on Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Users, exercise specifications, workouts and training sessions are stored in a
//! single `SQLite` database. Repositories in [`repositories`] wrap [`Database`] behind
//! async traits so managers can be tested against any implementation.

mod training;
mod users;

/// Repository traits and their `SQLite` implementations
pub mod repositories;

pub use crate::errors::DatabaseError;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::{DatabaseConfig, DatabaseUrl};

/// Database manager
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database and create any missing tables
    ///
    /// File URLs get `?mode=rwc` so `SQLite` creates the file when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the migration fails
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let db = Self::connect(database_url).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Open the database described by `config`, migrating only when `auto_migrate` is set
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the migration fails
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let db = Self::connect(&config.url.to_connection_string()).await?;
        if config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let url = DatabaseUrl::parse_url(database_url)
            .map_err(|e| DatabaseError::ConnectionError(e.message))?;

        let connected = if url.is_memory() {
            // Every connection to :memory: is a separate database, so keep exactly one alive
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&url.to_connection_string())
                .await
        } else {
            if let DatabaseUrl::SQLite { path } = &url {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        DatabaseError::ConnectionError(format!(
                            "Cannot create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            SqlitePool::connect(&format!("{}?mode=rwc", url.to_connection_string())).await
        };
        let pool = connected.map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        debug!(database = %url, "Database connection pool opened");
        Ok(Self { pool })
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create every table and index
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        self.migrate_users()
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        self.migrate_training()
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        info!("Database schema ready");
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
