// ABOUTME: User account commands for formcoach-cli
// ABOUTME: Creates clients, trainers and admins, lists, logs in, changes passwords and deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use formcoach::database::repositories::UserRepositoryImpl;
use formcoach::database::Database;
use formcoach::errors::AppResult;
use formcoach::managers::UserManager;
use formcoach::models::{AdminData, ClientData, RoleData, TrainerData, User, UserType};
use tracing::info;

use crate::helpers::display::{display_user_created, display_users};
use crate::AccountArgs;

type Result<T> = AppResult<T>;

fn user_manager(database: &Database) -> UserManager {
    UserManager::new(Arc::new(UserRepositoryImpl::new(database.clone())))
}

fn new_user(account: &AccountArgs, user_type: UserType) -> User {
    User::new(
        account.user_name.trim(),
        account.name.trim(),
        account.family_name.trim(),
        account.email.trim(),
        user_type,
    )
}

/// Register a client
pub async fn create_client(
    database: &Database,
    account: &AccountArgs,
    plan: String,
    level: String,
) -> Result<()> {
    let manager = user_manager(database);
    let client_data = ClientData {
        plan,
        level,
        ..ClientData::default()
    };
    let record = manager
        .create_client(new_user(account, UserType::Client), &account.password, client_data)
        .await?;
    display_user_created(&record);
    Ok(())
}

/// Register a trainer
pub async fn create_trainer(
    database: &Database,
    account: &AccountArgs,
    qualification: String,
    specialty: String,
    experience_years: u32,
) -> Result<()> {
    let manager = user_manager(database);
    let role = RoleData::Trainer(TrainerData {
        qualification,
        specialty,
        experience_years,
        resume: String::new(),
    });
    let record = manager
        .login_manager()
        .register(
            new_user(account, UserType::Trainer),
            &account.password,
            role,
            UserType::Trainer,
        )
        .await?;
    display_user_created(&record);
    Ok(())
}

/// Register an admin with full permissions
pub async fn create_admin(
    database: &Database,
    account: &AccountArgs,
    role_description: String,
) -> Result<()> {
    let manager = user_manager(database);
    let role = RoleData::Admin(AdminData {
        role_description,
        can_manage_users: true,
        can_modify_plans: true,
    });
    let record = manager
        .login_manager()
        .register(
            new_user(account, UserType::Admin),
            &account.password,
            role,
            UserType::Admin,
        )
        .await?;
    display_user_created(&record);
    Ok(())
}

/// List users, optionally of one type
pub async fn list(database: &Database, user_type: Option<&str>) -> Result<()> {
    let filter = user_type.map(|raw| raw.parse::<UserType>().unwrap_or_default());
    let users = user_manager(database).list_users(filter).await?;
    display_users(&users);
    Ok(())
}

/// Check credentials and stamp the login time
pub async fn login(database: &Database, user: &str, password: &str) -> Result<()> {
    let mut manager = user_manager(database);
    let record = manager.login(user, password).await?;
    println!(
        "Logged in as {} ({}, id {})",
        record.user.full_name(),
        record.user.user_type,
        record.user.id
    );
    manager.logout();
    Ok(())
}

/// Replace a password after checking the current one
pub async fn change_password(
    database: &Database,
    id: i64,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    user_manager(database)
        .login_manager()
        .change_password(id, old_password, new_password)
        .await?;
    println!("Password changed for user {id}");
    Ok(())
}

/// Delete a user from every table
pub async fn delete(database: &Database, id: i64) -> Result<()> {
    user_manager(database).delete_user(id).await?;
    info!(user_id = id, "User removed");
    println!("User {id} deleted");
    Ok(())
}
