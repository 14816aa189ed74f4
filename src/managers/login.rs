// ABOUTME: Login, client registration and password changes backed by bcrypt hashes
// ABOUTME: Hashing runs on the blocking pool so the async executor is never stalled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::ValidationManager;
use crate::database::repositories::UserRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{ClientData, RoleData, User, UserRecord, UserType};

/// Authentication against the user repository
#[derive(Clone)]
pub struct LoginManager {
    users: Arc<dyn UserRepository>,
}

/// Debug builds hash with cost 4, release builds with `bcrypt::DEFAULT_COST`
fn bcrypt_cost() -> u32 {
    if cfg!(debug_assertions) {
        4
    } else {
        bcrypt::DEFAULT_COST
    }
}

/// Hash a password on the blocking pool
///
/// # Errors
///
/// Returns an internal error if hashing fails
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost()))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Compare a password with a stored hash on the blocking pool
///
/// A malformed stored hash counts as a mismatch.
///
/// # Errors
///
/// Returns an internal error if the blocking task panics
pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
}

impl LoginManager {
    /// Create a login manager over a user repository
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn find_user(&self, user_or_email: &str) -> AppResult<Option<UserRecord>> {
        let lookup = match self.users.get_user_by_name(user_or_email).await {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => self.users.get_user_by_email(user_or_email).await,
            Err(e) => Err(e),
        };
        lookup.map_err(|e| AppError::database("error retrieving user").with_source(e))
    }

    /// Authenticate by user name or email and stamp the login time
    ///
    /// # Errors
    ///
    /// - `AuthInvalid` "no such user" when neither lookup finds the account
    /// - `AuthInvalid` "wrong credentials" when the password does not match
    /// - `DatabaseError` "error retrieving user" when the repository fails
    pub async fn login(&self, user_or_email: &str, password: &str) -> AppResult<UserRecord> {
        let Some(mut record) = self.find_user(user_or_email.trim()).await? else {
            warn!(user = %user_or_email, "Login attempt for unknown user");
            return Err(AppError::auth_invalid("no such user"));
        };

        if !verify_password(password, &record.user.password_hash).await? {
            warn!(user_id = record.user.id, "Login attempt with wrong password");
            return Err(AppError::auth_invalid("wrong credentials").with_user_id(record.user.id));
        }

        let now = Utc::now();
        self.users.update_last_login(record.user.id, now).await?;
        record.user.last_login = Some(now);

        info!(user_id = record.user.id, user_type = %record.user.user_type, "User logged in");
        Ok(record)
    }

    /// Validate and store a new client account with a bcrypt-hashed password
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when a field fails validation
    /// - `ResourceAlreadyExists` when the user name or the email (ignoring case) is taken
    /// - `DatabaseError` when saving fails
    pub async fn register_new_client(
        &self,
        user: User,
        password: &str,
        client_data: ClientData,
    ) -> AppResult<UserRecord> {
        self.register(user, password, RoleData::Client(client_data), UserType::Client)
            .await
    }

    /// Store a new account of any type; the CLI creates trainers and admins through this
    ///
    /// # Errors
    ///
    /// Same failures as [`Self::register_new_client`]
    pub async fn register(
        &self,
        mut user: User,
        password: &str,
        role: RoleData,
        user_type: UserType,
    ) -> AppResult<UserRecord> {
        ValidationManager::validate_new_client(&user, password)?;
        if self.users.user_name_exists(&user.user_name).await? {
            return Err(AppError::already_exists(format!("User '{}'", user.user_name)));
        }
        if self.users.get_user_by_email(&user.email).await?.is_some() {
            return Err(AppError::already_exists(format!("Email '{}'", user.email)));
        }

        user.user_type = user_type;
        user.password_hash = hash_password(password).await?;
        let mut record = UserRecord { user, role };
        record.user.id = self.users.save_user(&record).await?;

        info!(
            user_id = record.user.id,
            user_type = %record.user.user_type,
            "User registered"
        );
        Ok(record)
    }

    /// Replace a password after checking the current one
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` when the user does not exist
    /// - `AuthInvalid` "wrong credentials" when `old_password` does not match
    /// - `InvalidInput` when `new_password` is too short
    pub async fn change_password(
        &self,
        id: i64,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let record = self
            .users
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_user_id(id))?;

        if !verify_password(old_password, &record.user.password_hash).await? {
            return Err(AppError::auth_invalid("wrong credentials").with_user_id(id));
        }
        ValidationManager::validate_password(new_password)?;

        let hash = hash_password(new_password).await?;
        self.users.update_password_hash(id, &hash).await?;
        info!(user_id = id, "Password changed");
        Ok(())
    }
}
