pub mod auth;

pub use auth::{CurrentUser, require_token};
