use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use kinship_types::{User, UserSummary, DEFAULT_PROFILE_PICTURE};

use super::{timestamp_at, timestamp_text, uuid_at};
use crate::db::DbPool;
use crate::error::{unique_violation, DomainError, DomainResult};

const USER_COLUMNS: &str =
    "id, username, email, full_name, profile_picture, bio, created_at";

/// Account data accepted by `UserRepository::create`. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: uuid_at(row, 0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            full_name: row.get(3)?,
            profile_picture: row.get(4)?,
            bio: row.get(5)?,
            created_at: timestamp_at(row, 6)?,
        })
    }

    fn find_one(&self, filter: &str, value: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, filter);
        let user = conn
            .query_row(&sql, [value], Self::map_user)
            .optional()?;
        Ok(user)
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        self.find_one("id", &user_id.to_string())
    }

    /// Up to `limit` other users to suggest, newest accounts first
    pub fn suggestions(&self, exclude_id: &Uuid, limit: usize) -> Result<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, profile_picture FROM users
             WHERE id <> ?
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?",
        )?;
        let users = stmt
            .query_map((exclude_id.to_string(), limit as i64), |row| {
                Ok(UserSummary {
                    id: uuid_at(row, 0)?,
                    username: row.get(1)?,
                    profile_picture: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username", username)
    }

    /// Get user by email
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", email)
    }

    /// Get a user together with their stored password hash
    pub fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {}, hashed_password FROM users WHERE username = ?",
            USER_COLUMNS
        );
        let found = conn
            .query_row(&sql, [username], |row| {
                Ok((Self::map_user(row)?, row.get::<_, String>(7)?))
            })
            .optional()?;
        Ok(found)
    }

    /// Create a new user.
    ///
    /// Username and email uniqueness is checked first for a friendly error;
    /// the UNIQUE constraints catch anything that slips past under a race.
    pub fn create(&self, new_user: &NewUser) -> DomainResult<User> {
        if self.get_by_username(&new_user.username)?.is_some() {
            return Err(DomainError::UsernameTaken);
        }
        if self.get_by_email(&new_user.email)?.is_some() {
            return Err(DomainError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            full_name: new_user.full_name.clone(),
            profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            bio: None,
            created_at: Utc::now(),
        };

        let conn = self.pool.get().context("Failed to get database connection")?;
        let inserted = conn.execute(
            "INSERT INTO users (id, username, email, full_name, profile_picture, hashed_password, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.username,
                &user.email,
                &user.full_name,
                &user.profile_picture,
                &new_user.hashed_password,
                timestamp_text(&user.created_at),
            ),
        );

        match inserted {
            Ok(_) => Ok(user),
            Err(e) => match unique_violation(&e) {
                Some("users.username") => Err(DomainError::UsernameTaken),
                Some("users.email") => Err(DomainError::EmailTaken),
                _ => Err(anyhow::Error::new(e).context("Failed to create user").into()),
            },
        }
    }
}
