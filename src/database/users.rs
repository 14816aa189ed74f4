// ABOUTME: User management database operations
// ABOUTME: Accounts, role tables (clients, trainers, admins), preferences and client profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use tracing::warn;

use super::training::row_id;
use super::Database;
use crate::errors::DatabaseError;
use crate::models::{
    AdminData, ClientData, ClientProfile, ProfileSection, RoleData, TrainerData, User,
    UserPreferences, UserRecord, UserType,
};

const USER_COLUMNS: &str =
    "id, user_name, name, family_name, email, password_hash, user_type, join_date, last_login";

impl Database {
    /// Create users, role, preference and profile tables
    pub(super) async fn migrate_users(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                user_name TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                family_name TEXT NOT NULL DEFAULT '',
                email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                user_type TEXT NOT NULL,
                join_date TEXT NOT NULL,
                last_login TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS clients (
                id_user INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                plan TEXT NOT NULL DEFAULT '',
                level TEXT NOT NULL DEFAULT ''
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainers (
                id_user INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                qualification TEXT NOT NULL DEFAULT '',
                specialty TEXT NOT NULL DEFAULT '',
                experience_years INTEGER NOT NULL DEFAULT 0,
                resume TEXT NOT NULL DEFAULT ''
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS admins (
                id_user INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                role_description TEXT NOT NULL DEFAULT '',
                can_manage_users BOOLEAN NOT NULL DEFAULT 0,
                can_modify_plans BOOLEAN NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_preferences (
                id_user INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                language TEXT NOT NULL,
                notifications BOOLEAN NOT NULL,
                units TEXT NOT NULL,
                dual_mode BOOLEAN NOT NULL,
                feedback_mode TEXT NOT NULL,
                info_sound BOOLEAN NOT NULL,
                alert_sound BOOLEAN NOT NULL,
                mute BOOLEAN NOT NULL,
                view1 TEXT NOT NULL,
                view2 TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS client_profiles (
                id_user INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                section TEXT NOT NULL,
                field TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (id_user, section, field)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_type ON users(user_type)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get a user with role data by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_record(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.complete_record(row).await
    }

    /// Get a user with role data by user name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_name(&self, user_name: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_name = ?"))
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;
        self.complete_record(row).await
    }

    /// Get a user with role data by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        self.complete_record(row).await
    }

    async fn complete_record(
        &self,
        row: Option<SqliteRow>,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let user = row_to_user(&row)?;
        let role = self.load_role(&user).await?;
        Ok(Some(UserRecord { user, role }))
    }

    async fn load_role(&self, user: &User) -> Result<RoleData, DatabaseError> {
        let role = match user.user_type {
            UserType::Client => {
                let row = sqlx::query("SELECT plan, level FROM clients WHERE id_user = ?")
                    .bind(user.id)
                    .fetch_optional(&self.pool)
                    .await?;
                let profile = self.get_client_profile(user.id).await?;
                match row {
                    Some(row) => RoleData::Client(ClientData {
                        plan: row.try_get("plan")?,
                        level: row.try_get("level")?,
                        profile,
                    }),
                    None => RoleData::Client(ClientData {
                        profile,
                        ..ClientData::default()
                    }),
                }
            }
            UserType::Trainer => sqlx::query(
                "SELECT qualification, specialty, experience_years, resume FROM trainers WHERE id_user = ?",
            )
            .bind(user.id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| -> Result<RoleData, sqlx::Error> {
                Ok(RoleData::Trainer(TrainerData {
                    qualification: row.try_get("qualification")?,
                    specialty: row.try_get("specialty")?,
                    experience_years: u32::try_from(row.try_get::<i64, _>("experience_years")?)
                        .unwrap_or_default(),
                    resume: row.try_get("resume")?,
                }))
            })
            .transpose()?
            .unwrap_or_else(|| RoleData::Trainer(TrainerData::default())),
            UserType::Admin => sqlx::query(
                "SELECT role_description, can_manage_users, can_modify_plans FROM admins WHERE id_user = ?",
            )
            .bind(user.id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| -> Result<RoleData, sqlx::Error> {
                Ok(RoleData::Admin(AdminData {
                    role_description: row.try_get("role_description")?,
                    can_manage_users: row.try_get("can_manage_users")?,
                    can_modify_plans: row.try_get("can_modify_plans")?,
                }))
            })
            .transpose()?
            .unwrap_or_else(|| RoleData::Admin(AdminData::default())),
            UserType::Unknown => RoleData::None,
        };
        Ok(role)
    }

    /// List users, optionally restricted to one type, ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_users(&self, user_type: Option<UserType>) -> Result<Vec<User>, DatabaseError> {
        let rows = match user_type {
            Some(kind) => {
                sqlx::query(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE user_type = ? ORDER BY id"
                ))
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(row_to_user).collect()
    }

    /// Next free user id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_user_id(&self) -> Result<i64, DatabaseError> {
        let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(next)
    }

    /// Whether a user name is taken
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn user_name_exists(&self, user_name: &str) -> Result<bool, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_name = ?")
            .bind(user_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Insert or update a user and its role row; returns the user id
    ///
    /// A zero id lets SQLite allocate the id inside the insert.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the user name or email belongs to another user
    pub async fn save_user(&self, record: &UserRecord) -> Result<i64, DatabaseError> {
        let user = &record.user;
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r"
            INSERT INTO users (id, user_name, name, family_name, email, password_hash, user_type, join_date, last_login)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                user_name = excluded.user_name,
                name = excluded.name,
                family_name = excluded.family_name,
                email = excluded.email,
                password_hash = excluded.password_hash,
                user_type = excluded.user_type,
                last_login = excluded.last_login
            ",
        )
        .bind(row_id(user.id))
        .bind(&user.user_name)
        .bind(&user.name)
        .bind(&user.family_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(user.join_date)
        .bind(user.last_login)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, &user.user_name))?;
        let id = if user.id == 0 {
            inserted.last_insert_rowid()
        } else {
            user.id
        };

        save_role(&mut tx, id, &record.role).await?;
        if let RoleData::Client(client) = &record.role {
            replace_profile(&mut tx, id, &client.profile).await?;
        }
        tx.commit().await?;
        Ok(id)
    }

    /// Delete a user from every table; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        for table in ["clients", "trainers", "admins", "user_preferences", "client_profiles"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE id_user = ?"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Record a successful login
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist
    pub async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let affected = sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        ensure_found(affected, id)
    }

    /// Replace a user's password hash
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist
    pub async fn update_password_hash(&self, id: i64, hash: &str) -> Result<(), DatabaseError> {
        let affected = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        ensure_found(affected, id)
    }

    /// Load a client's profile; empty when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_client_profile(&self, id_user: i64) -> Result<ClientProfile, DatabaseError> {
        let rows = sqlx::query(
            "SELECT section, field, value FROM client_profiles WHERE id_user = ? ORDER BY section, field",
        )
        .bind(id_user)
        .fetch_all(&self.pool)
        .await?;

        let mut profile = ClientProfile::default();
        for row in rows {
            let section: String = row.try_get("section")?;
            let field: String = row.try_get("field")?;
            let value: String = row.try_get("value")?;
            let stored = section
                .parse::<ProfileSection>()
                .and_then(|section| profile.set(section, &field, value));
            if let Err(e) = stored {
                warn!(user_id = id_user, section = %section, field = %field, error = %e, "Skipping stored profile field");
            }
        }
        Ok(profile)
    }

    /// Replace a client's stored profile
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn save_client_profile(
        &self,
        id_user: i64,
        profile: &ClientProfile,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        replace_profile(&mut tx, id_user, profile).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Load a user's preferences
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_preferences(&self, id_user: i64) -> Result<Option<UserPreferences>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id_user, language, notifications, units, dual_mode, feedback_mode,
                   info_sound, alert_sound, mute, view1, view2
            FROM user_preferences WHERE id_user = ?
            ",
        )
        .bind(id_user)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<UserPreferences, DatabaseError> {
            Ok(UserPreferences {
                id_user: row.try_get("id_user")?,
                language: row.try_get("language")?,
                notifications: row.try_get("notifications")?,
                units: row.try_get("units")?,
                dual_mode: row.try_get("dual_mode")?,
                feedback_mode: parse_lenient(&row.try_get::<String, _>("feedback_mode")?),
                info_sound: row.try_get("info_sound")?,
                alert_sound: row.try_get("alert_sound")?,
                mute: row.try_get("mute")?,
                view1: parse_lenient(&row.try_get::<String, _>("view1")?),
                view2: parse_lenient(&row.try_get::<String, _>("view2")?),
            })
        })
        .transpose()
    }

    /// Insert or replace a user's preferences
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails
    pub async fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT OR REPLACE INTO user_preferences
                (id_user, language, notifications, units, dual_mode, feedback_mode,
                 info_sound, alert_sound, mute, view1, view2)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(preferences.id_user)
        .bind(&preferences.language)
        .bind(preferences.notifications)
        .bind(&preferences.units)
        .bind(preferences.dual_mode)
        .bind(preferences.feedback_mode.as_str())
        .bind(preferences.info_sound)
        .bind(preferences.alert_sound)
        .bind(preferences.mute)
        .bind(preferences.view1.as_str())
        .bind(preferences.view2.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.try_get("id")?,
        user_name: row.try_get("user_name")?,
        name: row.try_get("name")?,
        family_name: row.try_get("family_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        user_type: parse_lenient(&row.try_get::<String, _>("user_type")?),
        join_date: row.try_get("join_date")?,
        last_login: row.try_get("last_login")?,
    })
}

pub(super) fn parse_lenient<T>(raw: &str) -> T
where
    T: std::str::FromStr<Err = std::convert::Infallible>,
{
    match raw.parse() {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

fn unique_violation(error: sqlx::Error, key: &str) -> DatabaseError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DatabaseError::Duplicate {
            entity_type: "user",
            key: key.to_owned(),
        },
        _ => DatabaseError::from(error),
    }
}

fn ensure_found(affected: u64, id: i64) -> Result<(), DatabaseError> {
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "user",
            entity_id: id.to_string(),
        });
    }
    Ok(())
}

async fn save_role(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    role: &RoleData,
) -> Result<(), DatabaseError> {
    for table in ["clients", "trainers", "admins"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE id_user = ?"))
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    match role {
        RoleData::Client(client) => {
            sqlx::query("INSERT INTO clients (id_user, plan, level) VALUES (?, ?, ?)")
                .bind(id)
                .bind(&client.plan)
                .bind(&client.level)
                .execute(&mut **tx)
                .await?;
        }
        RoleData::Trainer(trainer) => {
            sqlx::query(
                "INSERT INTO trainers (id_user, qualification, specialty, experience_years, resume) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&trainer.qualification)
            .bind(&trainer.specialty)
            .bind(i64::from(trainer.experience_years))
            .bind(&trainer.resume)
            .execute(&mut **tx)
            .await?;
        }
        RoleData::Admin(admin) => {
            sqlx::query(
                "INSERT INTO admins (id_user, role_description, can_manage_users, can_modify_plans) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&admin.role_description)
            .bind(admin.can_manage_users)
            .bind(admin.can_modify_plans)
            .execute(&mut **tx)
            .await?;
        }
        RoleData::None => {}
    }
    Ok(())
}

async fn replace_profile(
    tx: &mut Transaction<'_, Sqlite>,
    id_user: i64,
    profile: &ClientProfile,
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM client_profiles WHERE id_user = ?")
        .bind(id_user)
        .execute(&mut **tx)
        .await?;
    for section in ProfileSection::ALL {
        let Some(fields) = profile.section(section) else {
            continue;
        };
        for (field, value) in fields {
            sqlx::query(
                "INSERT INTO client_profiles (id_user, section, field, value) VALUES (?, ?, ?, ?)",
            )
            .bind(id_user)
            .bind(section.as_str())
            .bind(field)
            .bind(value)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}
