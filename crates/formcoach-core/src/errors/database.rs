// ABOUTME: Structured error types for database operations
// ABOUTME: Wraps sqlx and serde_json failures with context for repository callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

use super::{AppError, ErrorCode};

/// Database operation errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Entity lookup returned no row
    #[error("{entity_type} not found: {entity_id}")]
    NotFound {
        /// Table or entity name
        entity_type: &'static str,
        /// Identifier that was looked up
        entity_id: String,
    },

    /// Query execution failed
    #[error("Query failed: {context}")]
    QueryError {
        /// What was being attempted
        context: String,
    },

    /// Could not open or reach the database
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    /// Schema creation failed
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// A JSON column could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    /// Unique constraint violated
    #[error("{entity_type} already exists: {key}")]
    Duplicate {
        /// Table or entity name
        entity_type: &'static str,
        /// Conflicting key
        key: String,
    },
}

impl DatabaseError {
    /// Shorthand for a query failure with context
    #[must_use]
    pub fn query(context: impl Into<String>) -> Self {
        Self::QueryError {
            context: context.into(),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound {
                entity_type: "row",
                entity_id: String::new(),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(error.to_string())
            }
            sqlx::Error::Migrate(inner) => Self::MigrationError(inner.to_string()),
            other => Self::QueryError {
                context: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        let code = match &error {
            DatabaseError::NotFound { .. } => ErrorCode::ResourceNotFound,
            DatabaseError::Duplicate { .. } => ErrorCode::ResourceAlreadyExists,
            _ => ErrorCode::DatabaseError,
        };
        Self::new(code, error.to_string())
    }
}
