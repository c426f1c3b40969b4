//! Domain services: listing, record lifecycle and authentication.
//!
//! Services speak [`CatalogError`]; the HTTP layer turns it into the error
//! envelope through `From<CatalogError> for AppError`.

pub mod auth_service;
pub mod image_service;
pub mod item_service;
pub mod listing;
pub mod option_service;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Item not found")]
    ItemNotFound,
    #[error("Option not found")]
    OptionNotFound,
    #[error("Image not found")]
    ImageNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Wrong email or password")]
    WrongCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("storage: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
