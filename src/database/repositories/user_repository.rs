// ABOUTME: User account repository implementation
// ABOUTME: Handles user records, role rows, client profiles and preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::UserRepository;
use crate::database::{Database, DatabaseError};
use crate::models::{ClientProfile, User, UserPreferences, UserRecord, UserType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// `SQLite` implementation of `UserRepository`
#[derive(Clone)]
pub struct UserRepositoryImpl {
    db: Database,
}

impl UserRepositoryImpl {
    /// Create a new `UserRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn get_user_by_id(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError> {
        self.db.get_user_record(id).await
    }

    async fn get_user_by_name(
        &self,
        user_name: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        self.db.get_user_by_name(user_name).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        self.db.get_user_by_email(email).await
    }

    async fn list_users(&self, user_type: Option<UserType>) -> Result<Vec<User>, DatabaseError> {
        self.db.list_users(user_type).await
    }

    async fn save_user(&self, record: &UserRecord) -> Result<i64, DatabaseError> {
        self.db.save_user(record).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        self.db.delete_user(id).await
    }

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.db.update_last_login(id, at).await
    }

    async fn update_password_hash(&self, id: i64, hash: &str) -> Result<(), DatabaseError> {
        self.db.update_password_hash(id, hash).await
    }

    async fn get_client_profile(&self, id_user: i64) -> Result<ClientProfile, DatabaseError> {
        self.db.get_client_profile(id_user).await
    }

    async fn save_client_profile(
        &self,
        id_user: i64,
        profile: &ClientProfile,
    ) -> Result<(), DatabaseError> {
        self.db.save_client_profile(id_user, profile).await
    }

    async fn get_preferences(
        &self,
        id_user: i64,
    ) -> Result<Option<UserPreferences>, DatabaseError> {
        self.db.get_preferences(id_user).await
    }

    async fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DatabaseError> {
        self.db.save_preferences(preferences).await
    }

    async fn user_name_exists(&self, user_name: &str) -> Result<bool, DatabaseError> {
        self.db.user_name_exists(user_name).await
    }

    async fn next_user_id(&self) -> Result<i64, DatabaseError> {
        self.db.next_user_id().await
    }
}
