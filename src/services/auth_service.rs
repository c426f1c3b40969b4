//! AuthService: password login and bearer tokens.
//!
//! A token is 32 random bytes, handed to the client once as URL-safe
//! base64. Only its SHA-256 digest is stored, alongside an expiry.

use super::{CatalogError, CatalogResult, is_unique_violation};
use crate::models::user::{User, UserStatus};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

const USER_COLUMNS: &str =
    "SELECT users.id, users.name, users.email, users.password, users.status, users.created_at, users.updated_at FROM users";
const TOKEN_NAME: &str = "auth";

/// A freshly issued bearer token. The raw value is never stored.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    db: Arc<SqlitePool>,
    token_lifetime: Duration,
}

impl AuthService {
    pub fn new(db: Arc<SqlitePool>, token_lifetime_secs: i64) -> Self {
        Self {
            db,
            token_lifetime: Duration::seconds(token_lifetime_secs),
        }
    }

    pub async fn user_by_email(&self, email: &str) -> CatalogResult<User> {
        sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE users.email = ?"))
            .bind(email)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(CatalogError::UserNotFound)
    }

    /// Check credentials and issue a token.
    ///
    /// An unknown email is `UserNotFound`; a known email with the wrong
    /// password is `WrongCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> CatalogResult<IssuedToken> {
        let user = self.user_by_email(email).await?;
        if !verify_password(password, &user.password) {
            return Err(CatalogError::WrongCredentials);
        }

        let token = generate_token();
        let expires_at = Utc::now() + self.token_lifetime;

        let mut tx = self.db.begin().await?;
        sqlx::query(
            "INSERT INTO auth_tokens (user_id, name, token_hash, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(TOKEN_NAME)
        .bind(hash_token(&token))
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(user_id = user.id, %expires_at, "token issued");
        Ok(IssuedToken { token, expires_at })
    }

    /// Resolve a bearer value to its user, if the token is known and live.
    pub async fn authenticate(&self, raw_token: &str) -> CatalogResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "{USER_COLUMNS} JOIN auth_tokens t ON t.user_id = users.id
             WHERE t.token_hash = ? AND t.expires_at > ?"
        ))
        .bind(hash_token(raw_token))
        .bind(Utc::now())
        .fetch_optional(&*self.db)
        .await?
        .ok_or(CatalogError::Unauthorized)
    }

    /// Revoke every token of `user_id`. Returns how many were removed.
    pub async fn logout(&self, user_id: i64) -> CatalogResult<u64> {
        let mut tx = self.db.begin().await?;
        let removed = sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        debug!(user_id, removed, "tokens revoked");
        Ok(removed)
    }

    pub async fn create_user(&self, name: &str, email: &str, password: &str) -> CatalogResult<User> {
        let hash = hash_password(password)?;
        let now = Utc::now();

        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, name, email, password, status, created_at, updated_at",
        )
        .bind(name)
        .bind(email)
        .bind(hash)
        .bind(UserStatus::Active)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                CatalogError::Validation(format!("The email `{email}` has already been taken"))
            } else {
                CatalogError::Sqlx(err)
            }
        })?;
        tx.commit().await?;

        info!(user_id = user.id, email = %user.email, "user created");
        Ok(user)
    }
}

pub fn hash_password(password: &str) -> CatalogResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CatalogError::Storage(anyhow::anyhow!("hashing password: {err}")))
}

/// False for a mismatch and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_stable_hex() {
        let a = hash_token("abc");
        assert_eq!(a, hash_token("abc"));
        assert_ne!(a, hash_token("abd"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn tokens_are_random_and_url_safe() {
        let a = generate_token();
        assert_ne!(a, generate_token());
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("nope", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }
}
