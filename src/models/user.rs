//! API users. Passwords are stored as argon2 PHC strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Soft status of an account.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum UserStatus {
    Inactive = 0,
    #[default]
    Active = 1,
}

#[derive(Clone, FromRow, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, never rendered.
    pub password: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
