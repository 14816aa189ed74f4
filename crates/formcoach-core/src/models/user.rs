// ABOUTME: User account models with role-specific data for admins, trainers and clients
// ABOUTME: UserType parsing is case-insensitive and never fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::ClientProfile;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    /// Platform administrator
    Admin,
    /// Trainee who runs training sessions
    Client,
    /// Fitness trainer who designs exercises and workouts
    Trainer,
    /// Unrecognized role
    #[default]
    Unknown,
}

impl UserType {
    /// Canonical name used in storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Client => "Client",
            Self::Trainer => "Trainer",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "admin" => Self::Admin,
            "client" => Self::Client,
            "trainer" => Self::Trainer,
            _ => Self::Unknown,
        })
    }
}

/// Base account shared by every role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric identifier, 0 until persisted
    pub id: i64,
    /// Login name, unique
    pub user_name: String,
    /// Given name
    pub name: String,
    /// Family name
    pub family_name: String,
    /// Contact e-mail, also accepted as login
    pub email: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub user_type: UserType,
    /// Registration instant
    pub join_date: DateTime<Utc>,
    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build an unsaved user with `join_date` set to now
    #[must_use]
    pub fn new(
        user_name: impl Into<String>,
        name: impl Into<String>,
        family_name: impl Into<String>,
        email: impl Into<String>,
        user_type: UserType,
    ) -> Self {
        Self {
            id: 0,
            user_name: user_name.into(),
            name: name.into(),
            family_name: family_name.into(),
            email: email.into(),
            password_hash: String::new(),
            user_type,
            join_date: Utc::now(),
            last_login: None,
        }
    }

    /// "Name Family" for display
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.family_name).trim().to_owned()
    }
}

/// Client-specific data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientData {
    /// Subscription plan name
    pub plan: String,
    /// Training level
    pub level: String,
    /// Detailed profile sections
    pub profile: ClientProfile,
}

/// Trainer-specific data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerData {
    /// Professional qualification
    pub qualification: String,
    /// Specialty area
    pub specialty: String,
    /// Years of experience
    pub experience_years: u32,
    /// Free-form resume
    pub resume: String,
}

/// Admin-specific data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminData {
    /// Role description
    pub role_description: String,
    /// May create, edit and delete users
    pub can_manage_users: bool,
    /// May modify training plans
    pub can_modify_plans: bool,
}

/// Role-specific payload attached to a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleData {
    /// Client data
    Client(ClientData),
    /// Trainer data
    Trainer(TrainerData),
    /// Admin data
    Admin(AdminData),
    /// No role table row
    #[default]
    None,
}

impl RoleData {
    /// Empty role data matching a user type
    #[must_use]
    pub fn for_type(user_type: UserType) -> Self {
        match user_type {
            UserType::Client => Self::Client(ClientData::default()),
            UserType::Trainer => Self::Trainer(TrainerData::default()),
            UserType::Admin => Self::Admin(AdminData::default()),
            UserType::Unknown => Self::None,
        }
    }
}

/// A user together with its role data, the unit the repositories load and save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Base account
    pub user: User,
    /// Role-specific data
    pub role: RoleData,
}

impl UserRecord {
    /// Pair a user with empty role data of the matching type
    #[must_use]
    pub fn new(user: User) -> Self {
        let role = RoleData::for_type(user.user_type);
        Self { user, role }
    }

    /// Client data if this is a client
    #[must_use]
    pub const fn client(&self) -> Option<&ClientData> {
        match &self.role {
            RoleData::Client(data) => Some(data),
            _ => None,
        }
    }
}
