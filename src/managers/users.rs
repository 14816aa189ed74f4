// ABOUTME: User manager tracking the logged-in user and wrapping account operations
// ABOUTME: Client creation goes through LoginManager so passwords are always hashed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::info;

use super::LoginManager;
use crate::database::repositories::UserRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ClientData, ClientProfile, RoleData, User, UserPreferences, UserRecord, UserType,
};

/// Account operations and the current login
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    login: LoginManager,
    current: Option<UserRecord>,
}

impl UserManager {
    /// Create a user manager with nobody logged in
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        let login = LoginManager::new(Arc::clone(&users));
        Self {
            users,
            login,
            current: None,
        }
    }

    /// The login manager sharing this manager's repository
    #[must_use]
    pub const fn login_manager(&self) -> &LoginManager {
        &self.login
    }

    /// Log in and remember the user
    ///
    /// # Errors
    ///
    /// See [`LoginManager::login`]
    pub async fn login(&mut self, user_or_email: &str, password: &str) -> AppResult<&UserRecord> {
        let record = self.login.login(user_or_email, password).await?;
        Ok(self.current.insert(record))
    }

    /// The logged-in user, if any
    #[must_use]
    pub const fn current_user(&self) -> Option<&UserRecord> {
        self.current.as_ref()
    }

    /// Forget the logged-in user
    pub fn logout(&mut self) {
        if let Some(record) = self.current.take() {
            info!(user_id = record.user.id, "User logged out");
        }
    }

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no user has this id
    pub async fn get_user(&self, id: i64) -> AppResult<UserRecord> {
        self.users
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_user_id(id))
    }

    /// Register a client with a hashed password
    ///
    /// # Errors
    ///
    /// See [`LoginManager::register_new_client`]
    pub async fn create_client(
        &self,
        user: User,
        password: &str,
        client_data: ClientData,
    ) -> AppResult<UserRecord> {
        self.login
            .register_new_client(user, password, client_data)
            .await
    }

    /// Replace a client's profile
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the user does not exist
    /// - `InvalidInput` if the user is not a client
    pub async fn update_client_profile(&self, id: i64, profile: &ClientProfile) -> AppResult<()> {
        let record = self.get_user(id).await?;
        if !matches!(record.role, RoleData::Client(_)) {
            return Err(AppError::invalid_input(format!(
                "user {id} is not a client"
            ))
            .with_user_id(id));
        }
        self.users.save_client_profile(id, profile).await?;
        Ok(())
    }

    /// Stored preferences, or the defaults for this user
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn get_preferences(&self, id: i64) -> AppResult<UserPreferences> {
        Ok(self
            .users
            .get_preferences(id)
            .await?
            .unwrap_or_else(|| UserPreferences::for_user(id)))
    }

    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn save_preferences(&self, preferences: &UserPreferences) -> AppResult<()> {
        self.users.save_preferences(preferences).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn list_users(&self, user_type: Option<UserType>) -> AppResult<Vec<User>> {
        Ok(self.users.list_users(user_type).await?)
    }

    /// Delete a user; logs out first if it is the current one
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no user has this id
    pub async fn delete_user(&mut self, id: i64) -> AppResult<()> {
        if !self.users.delete_user(id).await? {
            return Err(AppError::not_found("User").with_user_id(id));
        }
        if self.current.as_ref().is_some_and(|r| r.user.id == id) {
            self.logout();
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
